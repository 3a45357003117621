//! Applying route guards to the session store
//!
//! The guards in `bop_core::guard` only decide. This module acts on the
//! decision: a redirect replaces the current page through the navigator.

use bop_core::guard::check_path;
use bop_core::{GuardOutcome, RouteGuard};
use tracing::debug;

use crate::auth::SessionStore;

/// Check `path` with the guard of its tier and perform any redirect
pub fn enter(store: &SessionStore, path: &str) -> GuardOutcome {
    let outcome = check_path(&store.snapshot(), path);
    follow(store, path, outcome)
}

/// Check `path` with an explicit guard and perform any redirect
pub fn enter_with<G: RouteGuard>(store: &SessionStore, guard: &G, path: &str) -> GuardOutcome {
    let outcome = guard.check(&store.snapshot(), path);
    follow(store, path, outcome)
}

/// Like [`enter`], but first waits for startup resolution to finish, so the
/// outcome is never [`GuardOutcome::Loading`]
pub async fn enter_when_resolved(store: &SessionStore, path: &str) -> GuardOutcome {
    let mut rx = store.subscribe();
    // The sender lives in `store`, so the channel cannot close while we wait
    let _ = rx.wait_for(bop_core::Session::is_resolved).await;
    enter(store, path)
}

fn follow(store: &SessionStore, path: &str, outcome: GuardOutcome) -> GuardOutcome {
    if let GuardOutcome::Redirect(target) = &outcome {
        debug!(from = path, to = %target, "Guard redirect");
        store.client().navigator().push(target);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use bop_core::navigation::NavigationEvent;
    use bop_core::{MemoryCredentialStore, MemoryNavigator, RequireAuthenticated};
    use bop_http::ApiClient;
    use std::sync::Arc;

    fn anonymous_store(nav: &Arc<MemoryNavigator>) -> SessionStore {
        let client = ApiClient::builder()
            .base_url("http://127.0.0.1:9")
            .credentials(Arc::new(MemoryCredentialStore::new()))
            .navigator(nav.clone())
            .build()
            .unwrap();
        SessionStore::new(client)
    }

    #[tokio::test]
    async fn test_unresolved_session_does_not_navigate() {
        let nav = Arc::new(MemoryNavigator::new("/dashboard"));
        let store = anonymous_store(&nav);

        assert_eq!(enter(&store, "/dashboard"), GuardOutcome::Loading);
        assert!(nav.history().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_anonymous_redirects_to_login() {
        let nav = Arc::new(MemoryNavigator::new("/dashboard/users"));
        let store = anonymous_store(&nav);
        store.resolve().await;

        let outcome = enter_when_resolved(&store, "/dashboard/users").await;
        assert_eq!(
            outcome,
            GuardOutcome::Redirect("/auth/login?redirect=%2Fdashboard%2Fusers".to_string())
        );
        assert_eq!(
            nav.last_event(),
            Some(NavigationEvent::Push(
                "/auth/login?redirect=%2Fdashboard%2Fusers".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_explicit_guard_on_public_page() {
        let nav = Arc::new(MemoryNavigator::new("/"));
        let store = anonymous_store(&nav);
        store.resolve().await;

        assert!(enter(&store, "/auth/login").is_render());
        assert!(matches!(
            enter_with(&store, &RequireAuthenticated, "/"),
            GuardOutcome::Redirect(_)
        ));
    }
}
