//! BOP core types and utilities
//!
//! Everything in this crate is transport-agnostic: the session state machine,
//! the capability model, route guards and the credential storage seam. The
//! HTTP client lives in `bop-http` and drives these types.

pub mod access;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;

pub use access::Capability;
pub use error::{CoreError, CoreResult};
pub use guard::{GuardOutcome, RequireAdmin, RequireAuthenticated, RouteGuard};
pub use navigation::{MemoryNavigator, NavigationEvent, Navigator};
pub use routes::{AccessTier, Route};
pub use session::{Session, SessionAction, SessionPhase};
pub use storage::{
    CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore, StorageKey,
};
pub use types::{
    Currency, CurrencyAssignment, CurrencyUpdate, Identity, NewUser, Pagination, Role, RoleInput,
    User, UserCurrency, UserPage, UserUpdate,
};
pub use validation::{Validate, ValidationError, ValidationErrors};
