//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, delete_page_handler, folder_list_handler, folder_tree_handler,
    get_page_by_slug_handler, get_page_handler, health_handler, list_pages_handler,
    page_folder_tree_handler, refresh_version_handler, site_config_handler, stats_handler,
    version_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /pages` - List pages (`includeDrafts`, `hideDefaultIndex`, `metaOnly`)
/// - `GET /pages/:id`, `DELETE /pages/:id` - Read or delete one page
/// - `GET /pages/slug/:slug` - Read one page by slug
/// - `GET /folders/tree`, `GET /folders/page-tree`, `GET /folders/list`
/// - `GET /site-config`
/// - `GET /version`, `POST /version/refresh`
/// - `POST /cache/clear` - Drop page and folder caches
/// - `GET /stats`, `GET /health`
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pages", get(list_pages_handler))
        .route("/pages/slug/:slug", get(get_page_by_slug_handler))
        .route("/pages/:id", get(get_page_handler).delete(delete_page_handler))
        .route("/folders/tree", get(folder_tree_handler))
        .route("/folders/page-tree", get(page_folder_tree_handler))
        .route("/folders/list", get(folder_list_handler))
        .route("/site-config", get(site_config_handler))
        .route("/version", get(version_handler))
        .route("/version/refresh", post(refresh_version_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
