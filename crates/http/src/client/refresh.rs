//! Single-flight access token refresh
//!
//! Concurrent 401s queue on one async mutex. Whoever gets the lock first
//! performs the refresh; the others find a token different from the one
//! their request was rejected with and reuse it.

use bop_core::StorageKey;
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::auth::{RefreshRequest, TokenResponse};
use super::error::ClientError;
use super::{ApiClient, ApiRequest, decode};

/// Path of the refresh endpoint
pub const REFRESH_PATH: &str = "/users/refresh";

/// Serializes refresh attempts for every clone of one [`ApiClient`]
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    in_flight: Mutex<()>,
}

impl RefreshCoordinator {
    /// Obtain a usable access token after `stale` was rejected.
    ///
    /// # Errors
    ///
    /// Fails when no refresh token is stored or the refresh call fails.
    /// Credentials are not touched on failure; the caller ends the session.
    pub async fn refresh(
        &self,
        client: &ApiClient,
        stale: Option<&str>,
    ) -> Result<String, ClientError> {
        let _guard = self.in_flight.lock().await;

        let store = client.credentials();
        if let Some(current) = store.access_token()? {
            if stale != Some(current.as_str()) {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let refresh_token = store
            .refresh_token()?
            .ok_or_else(|| ClientError::SessionExpired("no refresh token stored".into()))?;

        info!("Refreshing access token");
        let tokens = exchange_refresh_token(client, &refresh_token).await?;
        let pair = tokens.into_credentials().ok_or_else(|| {
            ClientError::SessionExpired("refresh response carried no access token".into())
        })?;

        store.set(StorageKey::AccessToken, &pair.access_token)?;
        if let Some(rotated) = &pair.refresh_token {
            store.set(StorageKey::RefreshToken, rotated)?;
        }
        info!("Access token refreshed");
        Ok(pair.access_token)
    }
}

/// `POST /users/refresh`, sent without credentials and never intercepted
pub(crate) async fn exchange_refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<TokenResponse, ClientError> {
    let request = ApiRequest::new(Method::POST, REFRESH_PATH)
        .json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?
        .public();
    let response = client.send(&request, None).await?;
    decode(response).await
}
