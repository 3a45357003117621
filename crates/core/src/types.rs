//! Resource records exchanged with the backend

use serde::{Deserialize, Serialize};

use crate::access::Capability;

/// A role as returned by `/users/roles`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A user record as returned by `/users` and `/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub currency_context: Option<String>,
    #[serde(default)]
    pub has_password: bool,
    #[serde(default)]
    pub is_sso_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

const fn default_active() -> bool {
    true
}

/// Pagination block attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// A page of users
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<User>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// A currency known to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Currency {
    /// Canonical form of a typed currency code: trimmed and upper-case.
    ///
    /// `None` unless the code is non-empty ASCII letters and digits, so the
    /// result is always safe as a single URL path segment.
    pub fn normalize_code(code: &str) -> Option<String> {
        let code = code.trim();
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        Some(code.to_ascii_uppercase())
    }
}

/// Assignment of a currency to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCurrency {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub currency_code: String,
    #[serde(default)]
    pub is_default: bool,
    pub currency: Currency,
}

/// The authenticated user as the client knows them.
///
/// Built from the `/users/me` payload and replaced wholesale on every login or
/// profile refetch. The capability is resolved once here and carried along;
/// nothing downstream looks at the role name again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub role: Option<Role>,
    pub active: bool,
    pub currency_preference: Option<String>,
    capability: Capability,
}

impl Identity {
    /// Capability granted by the identity's role
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Whether the identity may open admin-only pages
    pub const fn is_admin(&self) -> bool {
        self.capability.is_admin()
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        let capability = Capability::from_role(user.role.as_ref());
        Self {
            id: user.id,
            display_name: user.name,
            email: user.email,
            role: user.role,
            active: user.is_active,
            currency_preference: user.currency_context,
            capability,
        }
    }
}

/// Default currency preference for new users
pub const DEFAULT_CURRENCY_CODE: &str = "SGD";

/// Body of role create and rename calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInput {
    pub name: String,
}

impl RoleInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Body of `POST /users/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: Option<i64>,
    pub currency_context: String,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role_id: None,
            currency_context: DEFAULT_CURRENCY_CODE.to_string(),
        }
    }
}

/// Partial update of a user; absent fields are left unchanged.
///
/// `role_id: Some(None)` clears the role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_context: Option<String>,
}

impl UserUpdate {
    /// Drop a blank password so the stored one is kept
    #[must_use]
    pub fn without_blank_password(mut self) -> Self {
        if self
            .password
            .as_deref()
            .is_some_and(|password| password.trim().is_empty())
        {
            self.password = None;
        }
        self
    }
}

/// Body of `PUT /users/{id}/currencies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAssignment {
    pub currency_codes: Vec<String>,
    pub default_currency: String,
}

/// Mutable fields of a currency; the code never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyUpdate {
    pub name: String,
    pub symbol: String,
    pub is_active: bool,
}

impl From<Currency> for CurrencyUpdate {
    fn from(currency: Currency) -> Self {
        Self {
            name: currency.name,
            symbol: currency.symbol,
            is_active: currency.is_active,
        }
    }
}
