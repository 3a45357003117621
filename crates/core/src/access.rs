//! Capability model
//!
//! The backend only tells us a role name. That name is mapped to a
//! [`Capability`] exactly once, in [`Capability::from_role`]; guards, the
//! navigation menu and the dashboard all consume the enum.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::types::Role;

/// Role names that grant administrative capability.
///
/// "Admininstrator" is a misspelling that exists in deployed backends.
const ADMIN_ROLE_NAMES: [&str; 3] = ["Admin", "Administrator", "Admininstrator"];

/// Roles the client refuses to delete
const PROTECTED_ROLE_NAMES: [&str; 2] = ["admin", "user"];

/// Currencies the client refuses to delete
const PROTECTED_CURRENCY_CODES: [&str; 2] = ["SGD", "IDR"];

/// Permission level of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May use every page
    Administrator,
    /// May use authenticated, non-admin pages
    #[default]
    Standard,
}

impl Capability {
    /// Resolve the capability granted by a role
    pub fn from_role(role: Option<&Role>) -> Self {
        match role {
            Some(role) if is_admin_role_name(&role.name) => Self::Administrator,
            _ => Self::Standard,
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => write!(f, "administrator"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

fn is_admin_role_name(name: &str) -> bool {
    let name = name.trim();
    ADMIN_ROLE_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Whether a role is a built-in system role
pub fn is_protected_role(name: &str) -> bool {
    let name = name.trim();
    PROTECTED_ROLE_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Whether a currency is a built-in system currency
pub fn is_protected_currency(code: &str) -> bool {
    let code = code.trim();
    PROTECTED_CURRENCY_CODES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(code))
}
