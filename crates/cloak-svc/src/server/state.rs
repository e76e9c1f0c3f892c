//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use fieldcloak::LogKey;

use crate::store::UserStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable so that Axum can clone the state for each
/// request without copying expensive data.
#[derive(Clone, Debug)]
pub struct AppState {
    /// In-memory user storage.
    pub users: UserStore,
    /// Name recorded on every request span.
    pub service_name: Arc<String>,
    /// Key for the reveal endpoint; the same key obscures the logs.
    pub log_key: Option<LogKey>,
    /// Whether `POST /users/reveal` is enabled.
    pub reveal_enabled: bool,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(
        users: UserStore,
        service_name: String,
        log_key: Option<LogKey>,
        reveal_enabled: bool,
    ) -> Self {
        Self {
            users,
            service_name: Arc::new(service_name),
            log_key,
            reveal_enabled,
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with an empty store and no key, suitable for tests.
    fn default() -> Self {
        Self::new(UserStore::new(), "cloak-svc".into(), None, false)
    }
}
