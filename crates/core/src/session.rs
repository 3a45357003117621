//! Session state machine
//!
//! `Unresolved` is the only initial state. Startup resolution moves it to
//! `Authenticated` or `Unauthenticated` exactly once; afterwards login and
//! logout toggle between the two resolved states. The session itself is never
//! persisted, only the credentials behind it.

use crate::access::Capability;
use crate::types::Identity;

/// Coarse phase of the session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Startup resolution has not finished yet
    Unresolved,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of who is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: SessionPhase,
    identity: Option<Identity>,
    loading: bool,
    last_error: Option<String>,
}

/// Transitions accepted by [`Session::reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Startup resolution finished; `None` means no usable credential
    Resolved(Option<Identity>),
    /// A login attempt is in flight
    LoginStarted,
    LoginSucceeded(Identity),
    LoginFailed(String),
    /// Profile refetch replaced the identity
    IdentityRefreshed(Identity),
    LoggedOut,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Unresolved,
            identity: None,
            loading: true,
            last_error: None,
        }
    }
}

impl Session {
    /// Apply a transition and return the next snapshot
    #[must_use]
    pub fn reduce(&self, action: SessionAction) -> Self {
        match action {
            SessionAction::Resolved(Some(identity))
            | SessionAction::LoginSucceeded(identity) => Self {
                phase: SessionPhase::Authenticated,
                identity: Some(identity),
                loading: false,
                last_error: None,
            },
            SessionAction::Resolved(None) | SessionAction::LoggedOut => Self {
                phase: SessionPhase::Unauthenticated,
                identity: None,
                loading: false,
                last_error: None,
            },
            SessionAction::LoginStarted => Self {
                loading: true,
                last_error: None,
                ..self.clone()
            },
            SessionAction::LoginFailed(message) => Self {
                phase: SessionPhase::Unauthenticated,
                identity: None,
                loading: false,
                last_error: Some(message),
            },
            SessionAction::IdentityRefreshed(identity) => {
                // A refetch cannot authenticate a session that was never resolved
                if self.phase == SessionPhase::Authenticated {
                    Self {
                        identity: Some(identity),
                        ..self.clone()
                    }
                } else {
                    self.clone()
                }
            }
        }
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.phase != SessionPhase::Unresolved
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Capability of the current identity; anonymous sessions are `Standard`
    pub fn capability(&self) -> Capability {
        self.identity
            .as_ref()
            .map_or(Capability::Standard, Identity::capability)
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.capability().is_admin()
    }
}
