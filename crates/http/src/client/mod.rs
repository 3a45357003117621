//! BOP HTTP client
//!
//! Every request reads the access token from the credential store right
//! before it is sent. A 401 on a protected request triggers exactly one
//! refresh-and-retry; when the refresh cannot succeed both tokens are cleared
//! and the user is sent to the login page.

pub mod auth;
pub mod currencies;
pub mod error;
pub mod refresh;
pub mod roles;
pub mod users;

use bop_core::config::ApiConfig;
use bop_core::routes::login_redirect;
use bop_core::{CredentialStore, MemoryCredentialStore, MemoryNavigator, Navigator};
use error::ClientError;
use refresh::RefreshCoordinator;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A request that can be dispatched more than once
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    public: bool,
    redirect_on_expiry: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            public: false,
            redirect_on_expiry: true,
        }
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if the body cannot be encoded
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Send without credentials and never intercept its 401
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Clear credentials on a failed refresh but stay on the current page
    #[must_use]
    pub const fn without_redirect(mut self) -> Self {
        self.redirect_on_expiry = false;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// BOP API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresh: Arc<RefreshCoordinator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] for an invalid base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Absolute URL for a path below the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request against `path`
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, path)
    }

    /// Execute a request and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns the mapped HTTP error, a transport error, or
    /// [`ClientError::SessionExpired`] when the refresh failed
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.dispatch(&request).await?;
        decode(response).await
    }

    /// Execute a request whose response body is ignored
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`]
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        let response = self.dispatch(&request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Send once, then on a 401 refresh and resend exactly once
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let token = if request.public {
            None
        } else {
            self.credentials.access_token()?
        };

        let response = self.send(request, token.as_deref()).await?;
        if request.public || response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            "Received 401, attempting token refresh"
        );

        match self.refresh.refresh(self, token.as_deref()).await {
            // The retry is not intercepted again; a second 401 surfaces as-is
            Ok(fresh) => self.send(request, Some(&fresh)).await,
            Err(err) => {
                warn!(path = %request.path, "Token refresh failed: {err}");
                self.end_session(request.redirect_on_expiry);
                Err(ClientError::SessionExpired(err.to_string()))
            }
        }
    }

    pub(crate) async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ClientError> {
        let mut builder = self.client.request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            debug!(path = %request.path, "Attaching bearer credential");
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        Ok(builder.send().await?)
    }

    /// Drop both tokens and, if asked, hard-navigate to the login page
    fn end_session(&self, redirect: bool) {
        if let Err(e) = self.credentials.clear_credentials() {
            warn!("Failed to clear credentials: {e}");
        }
        if redirect {
            let current = self.navigator.current_path();
            let path = current.split(['?', '#']).next().unwrap_or_default();
            let target = login_redirect(path);
            debug!(target = %target, "Redirecting to login after failed refresh");
            self.navigator.hard_redirect(&target);
        }
    }
}

/// Decode a JSON success body or map the error status
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    credentials: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Storage the tokens are read from and written to
    #[must_use]
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Navigator used for the forced login redirect
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the base URL is missing
    /// or not an absolute http(s) URL
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        let parsed = url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        default_headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(ApiConfig::REQUEST_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| ApiConfig::USER_AGENT.to_string()),
            )
            .default_headers(default_headers)
            .build()?;

        Ok(ApiClient {
            client,
            base_url,
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(MemoryNavigator::default())),
            refresh: Arc::new(RefreshCoordinator::default()),
        })
    }
}
