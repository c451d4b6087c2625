//! Application state shared across all handlers.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::gather::GatherService;
use crate::store::{JsonFileStore, RecordStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Record store the listings come from.
    store: Arc<dyn RecordStore>,

    /// Listing query service.
    gather: Arc<GatherService>,
}

impl AppState {
    /// Create state backed by the JSON file named in the config.
    pub fn new(config: &Config) -> Self {
        info!(path = %config.data_file.display(), "using JSON record store");
        let store = JsonFileStore::new(&config.data_file, config.store_cache_ttl);
        Self::with_store(config, Arc::new(store))
    }

    /// Create state around an existing record store.
    pub fn with_store(config: &Config, store: Arc<dyn RecordStore>) -> Self {
        let gather = GatherService::new(
            store.clone(),
            config.default_page_limit,
            config.max_page_limit,
        );
        Self {
            inner: Arc::new(AppStateInner { store, gather }),
        }
    }

    /// Get the listing query service.
    pub fn gather(&self) -> &Arc<GatherService> {
        &self.inner.gather
    }

    /// Check whether the record store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.healthy().await
    }
}
