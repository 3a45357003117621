//! Session store
//!
//! `SessionStore` is the one owner of the session. Readers take snapshots or
//! subscribe to changes; only the operations below mutate it. Every mutation
//! goes through [`Session::reduce`].

use bop_core::routes::{Route, redirect_param, safe_redirect_target};
use bop_core::{CredentialStore, Identity, Navigator, Session, SessionAction, StorageKey};
use bop_http::{ApiClient, ClientError};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use super::error_messages;
use super::oauth::{CallbackParams, OAuthCallbackError};

/// Authentication context shared by every page controller
pub struct SessionStore {
    client: ApiClient,
    state: watch::Sender<Session>,
    resolving: Mutex<()>,
}

impl SessionStore {
    /// Store in the unresolved state; call [`Self::resolve`] once at startup
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            client,
            state,
            resolving: Mutex::new(()),
        }
    }

    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    fn credentials(&self) -> &Arc<dyn CredentialStore> {
        self.client.credentials()
    }

    fn navigator(&self) -> &Arc<dyn Navigator> {
        self.client.navigator()
    }

    /// Current session
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: SessionAction) -> Session {
        let mut next = Session::default();
        self.state.send_modify(|session| {
            let before = session.phase();
            *session = session.reduce(action);
            if before != session.phase() {
                debug!(from = ?before, to = ?session.phase(), "Session transition");
            }
            next = session.clone();
        });
        next
    }

    /// Resolve the startup state from stored credentials.
    ///
    /// Fetches the profile at most once; concurrent and later callers get
    /// the already resolved session.
    pub async fn resolve(&self) -> Session {
        let _guard = self.resolving.lock().await;
        let current = self.snapshot();
        if current.is_resolved() {
            return current;
        }

        let token = match self.credentials().access_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read stored credentials: {e}");
                None
            }
        };
        if token.is_none() {
            debug!("No access token stored");
            return self.dispatch(SessionAction::Resolved(None));
        }

        match self.client.current_user_at_startup().await {
            Ok(user) => {
                let identity = Identity::from(user);
                info!(user_id = identity.id, capability = %identity.capability(), "Session restored");
                self.dispatch(SessionAction::Resolved(Some(identity)))
            }
            Err(err) => {
                if matches!(
                    err,
                    ClientError::AuthenticationFailed(_) | ClientError::SessionExpired(_)
                ) {
                    debug!("Stored credentials rejected, clearing");
                    if let Err(e) = self.credentials().clear_credentials() {
                        warn!("Failed to clear credentials: {e}");
                    }
                } else {
                    warn!("Startup profile fetch failed: {err}");
                }
                self.dispatch(SessionAction::Resolved(None))
            }
        }
    }

    /// Password login.
    ///
    /// Errors never escape: on failure the session stays unauthenticated,
    /// `last_error` is set and nothing is persisted. On success the user is
    /// sent to the `redirect` target of the current page, or the dashboard.
    pub async fn login(&self, email: &str, password: &str) -> Session {
        self.dispatch(SessionAction::LoginStarted);
        debug!(email, "Attempting login");

        match self.try_login(email, password).await {
            Ok(identity) => {
                info!(user_id = identity.id, "Login succeeded");
                let target = safe_redirect_target(
                    redirect_param(&self.navigator().current_path()).as_deref(),
                );
                let session = self.dispatch(SessionAction::LoginSucceeded(identity));
                self.navigator().push(&target);
                session
            }
            Err(err) => {
                warn!("Login failed: {err}");
                if let Err(e) = self.credentials().clear_credentials() {
                    warn!("Failed to clear credentials: {e}");
                }
                self.dispatch(SessionAction::LoginFailed(error_messages::login_failure(&err)))
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let pair = self
            .client
            .login(email, password)
            .await?
            .into_credentials()
            .ok_or(ClientError::MissingToken)?;
        self.credentials().store_credentials(&pair)?;
        let user = self.client.current_user().await?;
        Ok(Identity::from(user))
    }

    /// Remember where to return and leave for the backend's Google sign-in
    pub fn login_with_google(&self) {
        let current = self.navigator().current_path();
        let path = current.split(['?', '#']).next().unwrap_or_default();

        let target = if path == Route::LOGIN_PATH {
            redirect_param(&current)
        } else {
            Some(path.to_string())
        };
        if let Some(target) = target {
            if let Err(e) = self.credentials().set(StorageKey::RedirectAfterLogin, &target) {
                warn!("Failed to remember post-login target: {e}");
            }
        }

        let url = self.client.google_login_url();
        info!(url = %url, "Redirecting to Google sign-in");
        self.navigator().hard_redirect(&url);
    }

    /// Finish the OAuth round trip from the callback URL the provider sent
    /// the user to.
    ///
    /// # Errors
    ///
    /// Missing parameters, a rejected code, a response without tokens, or a
    /// failed profile fetch. On any of these the stored credentials are
    /// cleared and the session becomes unauthenticated with the error's
    /// message as `last_error`.
    pub async fn complete_google_callback(
        &self,
        callback: &str,
    ) -> Result<Identity, OAuthCallbackError> {
        let identity = match self.exchange_google_code(callback).await {
            Ok(identity) => identity,
            Err(err) => {
                warn!("Google sign-in failed: {err}");
                if let Err(e) = self.credentials().clear_credentials() {
                    warn!("Failed to clear credentials: {e}");
                }
                self.dispatch(SessionAction::LoginFailed(err.to_string()));
                return Err(err);
            }
        };

        let stored = self.credentials().take_redirect().unwrap_or_else(|e| {
            warn!("Failed to read post-login target: {e}");
            None
        });
        let target = safe_redirect_target(stored.as_deref());

        info!(user_id = identity.id, "Google sign-in completed");
        self.dispatch(SessionAction::LoginSucceeded(identity.clone()));
        self.navigator().push(&target);
        Ok(identity)
    }

    async fn exchange_google_code(&self, callback: &str) -> Result<Identity, OAuthCallbackError> {
        let params = CallbackParams::parse(callback)?;

        let tokens = self
            .client
            .google_callback(&params.code, Some(&params.state))
            .await
            .map_err(|err| {
                OAuthCallbackError::Exchange(error_messages::user_message(
                    &err,
                    "Failed to authenticate with Google",
                ))
            })?;
        let pair = tokens
            .into_credentials()
            .ok_or(OAuthCallbackError::NoToken)?;

        self.credentials()
            .store_credentials(&pair)
            .map_err(|e| OAuthCallbackError::Exchange(e.to_string()))?;

        let user = self.client.current_user().await.map_err(|err| {
            OAuthCallbackError::Exchange(error_messages::user_message(
                &err,
                "Failed to authenticate with Google",
            ))
        })?;
        Ok(Identity::from(user))
    }

    /// Drop credentials and identity, then show the login page
    pub fn logout(&self) -> Session {
        if let Err(e) = self.credentials().clear_credentials() {
            warn!("Failed to clear credentials: {e}");
        }
        let session = self.dispatch(SessionAction::LoggedOut);
        info!("Logged out");
        self.navigator().push(Route::LOGIN_PATH);
        session
    }

    /// Refetch the profile and replace the identity wholesale
    ///
    /// # Errors
    ///
    /// Propagates the profile call's error; the session is left unchanged
    pub async fn refresh_identity(&self) -> Result<Session, ClientError> {
        let user = self.client.current_user().await?;
        Ok(self.dispatch(SessionAction::IdentityRefreshed(Identity::from(user))))
    }
}
