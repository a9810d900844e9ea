//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies that are not
//! cache entries themselves.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for `DELETE /pages/:id`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

impl DeleteResponse {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Page '{}' deleted", id),
            id,
        }
    }
}

/// Response body for `POST /cache/clear`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Page and folder caches cleared".to_string(),
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub folder_tree_rebuilds: u64,
    pub folder_list_rebuilds: u64,
    pub fast_path_inserts: u64,
    pub fallback_rebuilds: u64,
    pub page_entries: usize,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            folder_tree_rebuilds: stats.folder_tree_rebuilds,
            folder_list_rebuilds: stats.folder_list_rebuilds,
            fast_path_inserts: stats.fast_path_inserts,
            fallback_rebuilds: stats.fallback_rebuilds,
            page_entries: stats.page_entries,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_enabled: bool,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(cache_enabled: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_enabled,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
