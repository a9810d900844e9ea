//! API Handlers
//!
//! HTTP request handlers over one shared [`ContentCache`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{
    CacheEntry, ConfigCache, ContentCache, FolderCache, PageCache, VersionCache,
};
use crate::error::Result;
use crate::models::{
    ClearResponse, DeleteResponse, FolderListItem, FolderNode, HealthResponse, PageListQuery,
    PageRecord, PageTreeQuery, SiteConfig, StatsResponse, VersionInfo,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ContentCache>,
}

impl AppState {
    pub fn new(cache: ContentCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn from_shared(cache: Arc<ContentCache>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /pages
///
/// Lists pages, as full records or metadata only.
pub async fn list_pages_handler(
    State(state): State<AppState>,
    Query(query): Query<PageListQuery>,
) -> Result<Response> {
    let filter = query.filter();
    if query.meta_only {
        let pages = state.cache.get_all_pages_meta(filter).await?;
        return Ok(Json(pages).into_response());
    }
    let pages = state.cache.get_all_pages(filter).await?;
    Ok(Json(pages).into_response())
}

/// Handler for GET /pages/:id
pub async fn get_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CacheEntry<PageRecord>>> {
    Ok(Json(state.cache.get_page(&id).await?))
}

/// Handler for GET /pages/slug/:slug
pub async fn get_page_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CacheEntry<PageRecord>>> {
    Ok(Json(state.cache.get_page_by_slug(&slug).await?))
}

/// Handler for DELETE /pages/:id
pub async fn delete_page_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete_page(&id).await?;
    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /folders/tree
pub async fn folder_tree_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheEntry<Vec<FolderNode>>>> {
    Ok(Json(state.cache.get_folder_tree().await?))
}

/// Handler for GET /folders/page-tree
pub async fn page_folder_tree_handler(
    State(state): State<AppState>,
    Query(query): Query<PageTreeQuery>,
) -> Result<Json<CacheEntry<Vec<FolderNode>>>> {
    Ok(Json(state.cache.get_page_folder_tree(query.filter()).await?))
}

/// Handler for GET /folders/list
pub async fn folder_list_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheEntry<Vec<FolderListItem>>>> {
    Ok(Json(state.cache.get_folder_list().await?))
}

/// Handler for GET /site-config
pub async fn site_config_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheEntry<SiteConfig>>> {
    Ok(Json(state.cache.get_site_config().await?))
}

/// Handler for GET /version
pub async fn version_handler(State(state): State<AppState>) -> Result<Json<VersionInfo>> {
    Ok(Json(state.cache.get_version().await?))
}

/// Handler for POST /version/refresh
pub async fn refresh_version_handler(State(state): State<AppState>) -> Result<Json<VersionInfo>> {
    Ok(Json(state.cache.update_version().await?))
}

/// Handler for POST /cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear_all_pages().await;
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_enabled()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::models::{ContentInput, PageData};
    use crate::registry::FixedVersion;
    use crate::store::MemoryStore;

    fn test_state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.add_page(
            "p1",
            PageData::new("Home", "index"),
            ContentInput::new("default", "Welcome"),
        );
        let cache = ContentCache::new(
            CacheConfig::default(),
            store.clone(),
            Arc::new(FixedVersion::new("1.2.3")),
        );
        (AppState::new(cache), store)
    }

    #[tokio::test]
    async fn test_get_page_handler_caches() {
        let (state, store) = test_state();

        let first = get_page_handler(State(state.clone()), Path("p1".to_string()))
            .await
            .unwrap();
        let second = get_page_handler(State(state), Path("p1".to_string()))
            .await
            .unwrap();

        assert_eq!(first.data().slug(), "index");
        assert_eq!(first.last_cache_update(), second.last_cache_update());
        assert_eq!(store.call_count("get_page_by_id"), 1);
    }

    #[tokio::test]
    async fn test_get_missing_page_is_error() {
        let (state, _) = test_state();
        let result = get_page_handler(State(state), Path("nope".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_page_handler() {
        let (state, _) = test_state();

        let response = delete_page_handler(State(state.clone()), Path("p1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.id, "p1");
        assert!(get_page_handler(State(state), Path("p1".to_string()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_version_handler() {
        let (state, _) = test_state();
        let response = version_handler(State(state)).await.unwrap();
        assert_eq!(response.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_stats_handler_counts_page_entries() {
        let (state, _) = test_state();
        get_page_handler(State(state.clone()), Path("p1".to_string()))
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.page_entries, 1);
        assert_eq!(response.misses, 2);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let (state, _) = test_state();
        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert!(response.cache_enabled);
    }
}
