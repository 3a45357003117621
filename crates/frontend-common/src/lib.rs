//! Shared front-end logic for the BOP admin console
//!
//! Nothing here renders. The session store, guards, menu and resource
//! controllers hold the state a page needs and perform its navigation, so
//! any front end (the `bop` CLI today) only has to display it.

pub mod auth;
pub mod auth_guard;
pub mod nav;
pub mod resources;

pub use auth::error_messages::{LOGIN_FAILED, SERVER_UNREACHABLE};
pub use auth::{CallbackParams, OAuthCallbackError, SessionStore};
pub use nav::{NavEntry, menu_for};
pub use resources::{
    ActionError, CurrenciesController, ListState, RolesController, UserEditContext,
    UsersController,
};
