//! BOP HTTP module providing the typed API client
//!
//! [`ApiClient`] injects the stored bearer credential, transparently refreshes
//! it once on a 401 and exposes one method per backend endpoint.

pub mod client;

pub use client::auth::TokenResponse;
pub use client::error::{ApiErrorBody, ClientError, ErrorCategory};
pub use client::{ApiClient, ApiClientBuilder, ApiRequest};
pub use reqwest::{Method, StatusCode};

/// Result alias for client calls
pub type Result<T> = std::result::Result<T, ClientError>;
