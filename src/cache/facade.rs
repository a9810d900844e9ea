//! Cache Facade
//!
//! [`ContentCache`] is the cache context: it owns every cache map, holds the
//! store adapter and registry client, and implements the per-entity cache
//! traits. Construct one per process (or per test) and share it by `Arc`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use super::state::{CacheState, FOLDER_TREE_KEY};
use super::{CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::models::{FolderNode, PageRecord};
use crate::registry::VersionSource;
use crate::store::{StoreAdapter, StoreError};

/// In-process content cache in front of a [`StoreAdapter`].
///
/// Locks are only held between awaits, never across a store or registry
/// call. Two concurrent misses for the same key may therefore both reach
/// the store; the later write wins.
pub struct ContentCache {
    pub(crate) config: CacheConfig,
    pub(crate) store: Arc<dyn StoreAdapter>,
    pub(crate) registry: Arc<dyn VersionSource>,
    pub(crate) state: RwLock<CacheState>,
}

impl ContentCache {
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn StoreAdapter>,
        registry: Arc<dyn VersionSource>,
    ) -> Self {
        info!(
            enabled = config.enabled,
            lifetime_ms = config.lifetime.as_millis() as u64,
            version_lifetime_ms = config.version_lifetime.as_millis() as u64,
            "content cache created"
        );
        Self {
            config,
            store,
            registry,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// The global switch. When off, reads always go to the store and clears
    /// do nothing.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub(crate) fn lifetime(&self) -> Duration {
        self.config.lifetime
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut stats = state.stats.clone();
        stats.set_page_entries(state.pages.len());
        stats
    }

    /// Empties every cache map. Statistics are kept.
    pub async fn clear_all(&self) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.write().await;
        let stats = std::mem::take(&mut state.stats);
        *state = CacheState {
            stats,
            ..CacheState::default()
        };
        info!("all content caches cleared");
    }

    // == Peeks ==
    // Read cached entries without touching statistics or the store.

    pub async fn cached_folder_tree(&self) -> Option<CacheEntry<Vec<FolderNode>>> {
        self.state
            .read()
            .await
            .folder_tree
            .get(FOLDER_TREE_KEY)
            .cloned()
    }

    pub async fn cached_page(&self, id: &str) -> Option<CacheEntry<PageRecord>> {
        self.state.read().await.pages.get(id).cloned()
    }

    pub async fn cached_page_count(&self) -> usize {
        self.state.read().await.pages.len()
    }

    /// Stores a freshly fetched page (when enabled) and returns its entry.
    pub(crate) async fn remember_page(&self, record: PageRecord) -> CacheEntry<PageRecord> {
        let entry = CacheEntry::new(record);
        if self.is_enabled() {
            self.state.write().await.put_page(entry.clone());
        }
        entry
    }
}

/// Adapts a store failure into the cache error for `operation`.
pub(crate) fn store_error(operation: &'static str) -> impl FnOnce(StoreError) -> CacheError {
    move |err| CacheError::from_source(operation, "store request failed", err)
}
