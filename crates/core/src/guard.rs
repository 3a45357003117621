//! Route guards
//!
//! A guard looks at the session snapshot and decides whether a page may be
//! shown. Guards never render anything themselves and never wait: while the
//! session is unresolved they answer [`GuardOutcome::Loading`] and the host
//! asks again once the session settles.

use tracing::debug;

use crate::routes::{AccessTier, Route, login_redirect};
use crate::session::Session;

/// Decision of a guard for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the protected content
    Render,
    /// Session still resolving; show a neutral placeholder
    Loading,
    /// Replace the current page with this path
    Redirect(String),
}

impl GuardOutcome {
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Access check applied before a page renders
pub trait RouteGuard {
    /// `current_path` is the path being guarded, including its query
    fn check(&self, session: &Session, current_path: &str) -> GuardOutcome;
}

/// Pages that need any logged-in user
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAuthenticated;

/// Pages that need an administrator
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAdmin;

impl RouteGuard for RequireAuthenticated {
    fn check(&self, session: &Session, current_path: &str) -> GuardOutcome {
        if !session.is_resolved() {
            return GuardOutcome::Loading;
        }
        if session.is_authenticated() {
            GuardOutcome::Render
        } else {
            debug!(path = current_path, "unauthenticated access, redirecting to login");
            GuardOutcome::Redirect(login_redirect(current_path))
        }
    }
}

impl RouteGuard for RequireAdmin {
    fn check(&self, session: &Session, current_path: &str) -> GuardOutcome {
        match RequireAuthenticated.check(session, current_path) {
            GuardOutcome::Render if session.is_admin() => GuardOutcome::Render,
            GuardOutcome::Render => {
                debug!(
                    path = current_path,
                    capability = %session.capability(),
                    "admin page denied"
                );
                GuardOutcome::Redirect(Route::DASHBOARD_PATH.to_string())
            }
            other => other,
        }
    }
}

/// Run the guard matching the page's tier
pub fn check_path(session: &Session, current_path: &str) -> GuardOutcome {
    match AccessTier::for_path(current_path) {
        AccessTier::Public => GuardOutcome::Render,
        AccessTier::Authenticated => RequireAuthenticated.check(session, current_path),
        AccessTier::AdminOnly => RequireAdmin.check(session, current_path),
    }
}
