//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::storage::Storage;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The storage backend is fixed for the life of
/// the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    storage: Storage,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, storage: Storage) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the active storage backend.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }
}
