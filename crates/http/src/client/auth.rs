//! Authentication API client methods

use bop_core::{CredentialPair, User};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ClientError};

/// Body of `POST /users/login`
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /users/refresh`
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token payload returned by login, refresh and the OAuth callback.
///
/// Older backends answer with a single `token` field instead of
/// `access_token`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TokenResponse {
    /// Credential pair carried by the response, if it has an access token
    pub fn into_credentials(self) -> Option<CredentialPair> {
        let access_token = self
            .access_token
            .filter(|token| !token.is_empty())
            .or(self.token.filter(|token| !token.is_empty()))?;
        Some(CredentialPair {
            access_token,
            refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
        })
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("has_access_token", &(self.access_token.is_some() || self.token.is_some()))
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("message", &self.message)
            .finish()
    }
}

/// Path of the backend's Google OAuth entry point
pub const GOOGLE_LOGIN_PATH: &str = "/auth/google/login";

/// Path of the backend's Google OAuth code exchange
pub const GOOGLE_CALLBACK_PATH: &str = "/auth/google/callback";

impl ApiClient {
    /// Exchange email and password for tokens
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let request = self
            .request(Method::POST, "/users/login")
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .public();
        self.execute(request).await
    }

    /// Profile of the user owning the stored access token
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let request = self.request(Method::GET, "/users/me");
        self.execute(request).await
    }

    /// Profile fetch used during startup; an expired session does not navigate
    pub async fn current_user_at_startup(&self) -> Result<User, ClientError> {
        let request = self.request(Method::GET, "/users/me").without_redirect();
        self.execute(request).await
    }

    /// Absolute URL the browser is sent to for Google sign-in
    pub fn google_login_url(&self) -> String {
        self.url(GOOGLE_LOGIN_PATH)
    }

    /// Complete the OAuth round trip by exchanging the provider's code
    pub async fn google_callback(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> Result<TokenResponse, ClientError> {
        let mut request = self
            .request(Method::GET, GOOGLE_CALLBACK_PATH)
            .query("code", code)
            .public();
        if let Some(state) = state {
            request = request.query("state", state);
        }
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_response_prefers_access_token() {
        let response: TokenResponse = serde_json::from_value(json!({
            "status": "success",
            "access_token": "a",
            "refresh_token": "r",
            "token": "legacy"
        }))
        .unwrap();
        let pair = response.into_credentials().unwrap();
        assert_eq!(pair.access_token, "a");
        assert_eq!(pair.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_token_response_legacy_field() {
        let response: TokenResponse =
            serde_json::from_value(json!({ "token": "legacy" })).unwrap();
        let pair = response.into_credentials().unwrap();
        assert_eq!(pair.access_token, "legacy");
        assert!(pair.refresh_token.is_none());
    }

    #[test]
    fn test_token_response_without_tokens() {
        let response: TokenResponse =
            serde_json::from_value(json!({ "message": "ok", "access_token": "" })).unwrap();
        assert!(response.into_credentials().is_none());
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "a@b.co".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
