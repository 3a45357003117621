//! Authentication module

pub mod context;
pub mod error_messages;
pub mod oauth;

// Re-export commonly used items
pub use context::SessionStore;
pub use oauth::{CallbackParams, OAuthCallbackError};
