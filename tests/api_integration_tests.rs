//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint against a
//! seeded in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use studiocms_cache::api::create_router;
use studiocms_cache::models::{ContentInput, FolderListItem, PageData, SiteConfig};
use studiocms_cache::registry::FixedVersion;
use studiocms_cache::store::MemoryStore;
use studiocms_cache::{AppState, CacheConfig, ContentCache};

// == Helper Functions ==

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.add_folder(FolderListItem::new("docs", "docs", None));
    store.add_folder(FolderListItem::new("api", "api", Some("docs")));
    store.add_page(
        "home",
        PageData::new("Home", "index"),
        ContentInput::new("default", "Welcome"),
    );
    store.add_page(
        "intro",
        PageData::new("Intro", "intro").in_folder("api"),
        ContentInput::new("default", "# Intro"),
    );
    store.add_page(
        "wip",
        PageData::new("Draft", "wip").as_draft(),
        ContentInput::new("default", "..."),
    );
    store.set_site_config(SiteConfig::new("Docs", "Project documentation"));
    store
}

fn create_test_app_with(store: Arc<MemoryStore>) -> Router {
    let cache = ContentCache::new(
        CacheConfig::default(),
        store,
        Arc::new(FixedVersion::new("0.1.0-beta.9")),
    );
    create_router(AppState::new(cache))
}

fn create_test_app() -> Router {
    create_test_app_with(seeded_store())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Page Endpoint Tests ==

#[tokio::test]
async fn test_list_pages_excludes_drafts_by_default() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/pages").await;

    assert_eq!(status, StatusCode::OK);
    let pages = json.as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p["data"]["draft"] == false));
}

#[tokio::test]
async fn test_list_pages_with_query_flags() {
    let app = create_test_app();

    let (_, with_drafts) = send(&app, "GET", "/pages?includeDrafts=true").await;
    assert_eq!(with_drafts.as_array().unwrap().len(), 3);

    let (_, no_index) = send(&app, "GET", "/pages?hideDefaultIndex=true").await;
    let slugs: Vec<_> = no_index
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["data"]["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, vec!["intro"]);
}

#[tokio::test]
async fn test_list_pages_meta_only() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/pages?metaOnly=true").await;

    assert_eq!(status, StatusCode::OK);
    for page in json.as_array().unwrap() {
        assert!(page["data"].get("defaultContent").is_none());
        assert!(page["data"].get("multiLangContent").is_none());
        assert!(page.get("lastCacheUpdate").is_some());
    }
}

#[tokio::test]
async fn test_get_page_by_id() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/pages/intro").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Intro");
    assert_eq!(json["data"]["urlRoute"], "docs/api");
    assert_eq!(json["data"]["defaultContent"]["content"], "# Intro");
}

#[tokio::test]
async fn test_get_page_by_slug() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/pages/slug/index").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], "home");
    assert_eq!(json["data"]["urlRoute"], "");
}

#[tokio::test]
async fn test_get_missing_page() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/pages/missing").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["operation"], "get_page");
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_repeated_reads_are_served_from_cache() {
    let store = seeded_store();
    let app = create_test_app_with(store.clone());

    let (_, first) = send(&app, "GET", "/pages/intro").await;
    let (_, second) = send(&app, "GET", "/pages/intro").await;

    assert_eq!(first["lastCacheUpdate"], second["lastCacheUpdate"]);
    assert_eq!(store.call_count("get_page_by_id"), 1);
}

#[tokio::test]
async fn test_delete_page() {
    let store = seeded_store();
    let app = create_test_app_with(store.clone());

    let (status, json) = send(&app, "DELETE", "/pages/intro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "intro");

    let (status, _) = send(&app, "GET", "/pages/intro").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.snapshot().pages.len(), 2);
}

// == Folder Endpoint Tests ==

#[tokio::test]
async fn test_folder_tree() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/folders/tree").await;

    assert_eq!(status, StatusCode::OK);
    let roots = json["data"].as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], "docs");
    assert_eq!(roots[0]["children"][0]["id"], "api");
}

#[tokio::test]
async fn test_folder_list() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/folders/list").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_page_folder_tree_attaches_pages() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/folders/page-tree").await;

    assert_eq!(status, StatusCode::OK);
    let roots = json["data"].as_array().unwrap();
    // docs folder plus the root-level home page
    assert_eq!(roots.len(), 2);
    let api = &roots[0]["children"][0];
    assert_eq!(api["children"][0]["isPage"], true);
    assert_eq!(api["children"][0]["name"], "Intro");
}

// == Site Config and Version Tests ==

#[tokio::test]
async fn test_site_config() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/site-config").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Docs");
}

#[tokio::test]
async fn test_version_and_refresh() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], "0.1.0-beta.9");

    let (status, json) = send(&app, "POST", "/version/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], "0.1.0-beta.9");
}

// == Cache Management Tests ==

#[tokio::test]
async fn test_clear_cache_forces_reload() {
    let store = seeded_store();
    let app = create_test_app_with(store.clone());

    send(&app, "GET", "/pages").await;
    let (status, json) = send(&app, "POST", "/cache/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("cleared"));

    send(&app, "GET", "/pages").await;
    assert_eq!(store.call_count("list_pages"), 2);
}

#[tokio::test]
async fn test_stats_reflect_hits_and_misses() {
    let app = create_test_app();

    send(&app, "GET", "/pages/intro").await;
    send(&app, "GET", "/pages/intro").await;
    let (status, json) = send(&app, "GET", "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["page_entries"], 1);
    assert!(json["hits"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}
