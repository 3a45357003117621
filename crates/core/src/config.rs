//! Client-side constants shared by every crate

use std::time::Duration;

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Durable storage key for the access credential
    pub const ACCESS_TOKEN_KEY: &'static str = "accessToken";

    /// Durable storage key for the refresh credential
    pub const REFRESH_TOKEN_KEY: &'static str = "refreshToken";

    /// Ephemeral storage key for the post-login redirect path
    pub const REDIRECT_AFTER_LOGIN_KEY: &'static str = "redirect_after_login";

    /// Query parameter carrying the post-login redirect path
    pub const REDIRECT_PARAM: &'static str = "redirect";
}

/// API client configuration
pub struct ApiConfig;

impl ApiConfig {
    /// Environment variable selecting the backend base URL
    pub const API_URL_ENV: &'static str = "BOP_API_URL";

    /// Used only when [`Self::API_URL_ENV`] is unset
    pub const FALLBACK_API_URL: &'static str = "http://localhost:5555/api/v1";

    /// Fixed request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// User agent sent with every request
    pub const USER_AGENT: &'static str = concat!("bop-console/", env!("CARGO_PKG_VERSION"));
}
