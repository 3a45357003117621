//! Navigation seam between session logic and whatever hosts the pages

use std::sync::{Mutex, PoisonError};

/// Moves the user between pages.
///
/// `push` is an in-app transition that keeps client state; `hard_redirect`
/// abandons all in-memory state and may leave the app entirely.
pub trait Navigator: Send + Sync {
    /// Path (with query) of the page currently shown
    fn current_path(&self) -> String;

    fn push(&self, path: &str);

    fn hard_redirect(&self, url: &str);
}

/// A single navigation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Push(String),
    HardRedirect(String),
}

/// In-memory navigator recording every transition
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    current: String,
    history: Vec<NavigationEvent>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(NavigatorState {
                current: initial_path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Transitions recorded so far, oldest first
    pub fn history(&self) -> Vec<NavigationEvent> {
        self.lock().history.clone()
    }

    /// Most recent transition, if any
    pub fn last_event(&self) -> Option<NavigationEvent> {
        self.lock().history.last().cloned()
    }

    /// Jump to a page without recording a transition
    pub fn set_current(&self, path: impl Into<String>) {
        self.lock().current = path.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn push(&self, path: &str) {
        let mut state = self.lock();
        state.current = path.to_string();
        state.history.push(NavigationEvent::Push(path.to_string()));
    }

    fn hard_redirect(&self, url: &str) {
        let mut state = self.lock();
        // Absolute URLs leave the app; keep the path only for in-app targets
        if url.starts_with('/') {
            state.current = url.to_string();
        }
        state
            .history
            .push(NavigationEvent::HardRedirect(url.to_string()));
    }
}
