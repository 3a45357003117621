//! Routing surface of the console and the authorization tier of each page

use std::fmt::{self, Display};
use url::form_urlencoded;

use crate::config::AuthConfig;

/// Who may open a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTier {
    Public,
    Authenticated,
    AdminOnly,
}

/// Every page the console knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    GoogleCallback,
    Dashboard,
    Users,
    UserCreate,
    UserDetail(i64),
    UserEdit(i64),
    Roles,
    Currencies,
    CurrencyCreate,
    CurrencyEdit(String),
}

impl Route {
    pub const LOGIN_PATH: &'static str = "/auth/login";
    pub const DASHBOARD_PATH: &'static str = "/dashboard";

    /// Path of the page, without query
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => Self::LOGIN_PATH.to_string(),
            Self::GoogleCallback => "/auth/google/callback".to_string(),
            Self::Dashboard => Self::DASHBOARD_PATH.to_string(),
            Self::Users => "/dashboard/users".to_string(),
            Self::UserCreate => "/dashboard/users/new".to_string(),
            Self::UserDetail(id) => format!("/dashboard/users/{id}"),
            Self::UserEdit(id) => format!("/dashboard/users/edit/{id}"),
            Self::Roles => "/dashboard/roles".to_string(),
            Self::Currencies => "/dashboard/currencies".to_string(),
            Self::CurrencyCreate => "/dashboard/currencies/new".to_string(),
            Self::CurrencyEdit(code) => format!("/dashboard/currencies/edit/{code}"),
        }
    }

    /// Authorization tier the guards enforce for this page
    pub const fn tier(&self) -> AccessTier {
        match self {
            Self::Home | Self::Login | Self::GoogleCallback => AccessTier::Public,
            Self::Dashboard => AccessTier::Authenticated,
            Self::Users
            | Self::UserCreate
            | Self::UserDetail(_)
            | Self::UserEdit(_)
            | Self::Roles
            | Self::Currencies
            | Self::CurrencyCreate
            | Self::CurrencyEdit(_) => AccessTier::AdminOnly,
        }
    }

    /// Parse a path (query and fragment are ignored)
    pub fn parse(path: &str) -> Option<Self> {
        let path = strip_query(path).trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["auth", "login"] => Self::Login,
            ["auth", "google", "callback"] => Self::GoogleCallback,
            ["dashboard"] => Self::Dashboard,
            ["dashboard", "users"] => Self::Users,
            ["dashboard", "users", "new"] => Self::UserCreate,
            ["dashboard", "users", "edit", id] => Self::UserEdit(id.parse().ok()?),
            ["dashboard", "users", id] => Self::UserDetail(id.parse().ok()?),
            ["dashboard", "roles"] => Self::Roles,
            ["dashboard", "currencies"] => Self::Currencies,
            ["dashboard", "currencies", "new"] => Self::CurrencyCreate,
            ["dashboard", "currencies", "edit", code] => Self::CurrencyEdit((*code).to_string()),
            _ => return None,
        };
        Some(route)
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl AccessTier {
    /// Tier of an arbitrary path. Unknown pages below the dashboard still
    /// require a session; everything else is public.
    pub fn for_path(path: &str) -> Self {
        Route::parse(path).map_or_else(
            || {
                let path = strip_query(path);
                if path == Route::DASHBOARD_PATH
                    || path.starts_with(&format!("{}/", Route::DASHBOARD_PATH))
                {
                    Self::Authenticated
                } else {
                    Self::Public
                }
            },
            |route| route.tier(),
        )
    }
}

/// Login page URL carrying `current_path` as the post-login target
pub fn login_redirect(current_path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(current_path.as_bytes()).collect();
    format!(
        "{}?{}={encoded}",
        Route::LOGIN_PATH,
        AuthConfig::REDIRECT_PARAM
    )
}

/// Extract the `redirect` query parameter from a path or query string
pub fn redirect_param(path_or_query: &str) -> Option<String> {
    let query = path_or_query
        .split_once('?')
        .map_or(path_or_query, |(_, query)| query);
    let query = query.split('#').next().unwrap_or_default();
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == AuthConfig::REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Accept only same-origin absolute paths as post-login targets
pub fn safe_redirect_target(candidate: Option<&str>) -> String {
    match candidate.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.starts_with(Route::LOGIN_PATH) =>
        {
            path.to_string()
        }
        _ => Route::DASHBOARD_PATH.to_string(),
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}
