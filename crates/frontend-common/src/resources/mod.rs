//! Resource list controllers
//!
//! Each controller owns the list a page shows, refetches it after every
//! successful mutation and turns client errors into the message the page
//! displays. Controllers never retry; the HTTP client already did the one
//! refresh it is allowed.

pub mod currencies;
pub mod roles;
pub mod users;

use bop_core::ValidationErrors;
use thiserror::Error;

pub use currencies::CurrenciesController;
pub use roles::RolesController;
pub use users::{UserEditContext, UsersController};

/// Why a create, update or delete did not happen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Required fields missing; nothing was sent
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// Refused client-side; nothing was sent
    #[error("{0}")]
    Blocked(String),

    /// The backend rejected the call or could not be reached
    #[error("{0}")]
    Failed(String),
}

/// What a list page renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self, result: Result<Vec<T>, String>) {
        match result {
            Ok(items) => self.items = items,
            Err(message) => self.error = Some(message),
        }
        self.loading = false;
    }
}
