//! Store Adapter
//!
//! The asynchronous data-access layer the cache sits in front of. The store
//! is the source of truth; the cache only ever projects what it returns.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ContentInput, FolderInput, FolderListItem, FolderNode, PageData, PageFilter, PageRecord,
    SiteConfig,
};

pub use memory::{ContentRow, MemoryStore, PageRow, StoreSnapshot};

/// Errors raised by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("{entity} `{id}` does not exist")]
    Missing { entity: &'static str, id: String },
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn missing(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Missing {
            entity,
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Async CRUD over pages, folders and site configuration.
///
/// Page reads take the current folder tree so the store can annotate each
/// record with its `url_route`; an empty slice leaves routes empty.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    async fn get_page_by_id(&self, id: &str, tree: &[FolderNode])
        -> StoreResult<Option<PageRecord>>;

    async fn get_page_by_slug(
        &self,
        slug: &str,
        tree: &[FolderNode],
    ) -> StoreResult<Option<PageRecord>>;

    async fn list_pages(&self, filter: PageFilter, tree: &[FolderNode])
        -> StoreResult<Vec<PageRecord>>;

    async fn list_pages_by_folder(
        &self,
        folder_id: &str,
        filter: PageFilter,
        tree: &[FolderNode],
    ) -> StoreResult<Vec<PageRecord>>;

    /// Inserts a page and its first content block, returning the new page id.
    async fn create_page(&self, data: PageData, content: ContentInput) -> StoreResult<String>;

    async fn update_page(&self, id: &str, data: PageData) -> StoreResult<()>;

    /// Upserts the content block for the input's language.
    async fn update_page_content(&self, id: &str, content: ContentInput) -> StoreResult<()>;

    async fn delete_page(&self, id: &str) -> StoreResult<()>;

    async fn get_site_config(&self) -> StoreResult<Option<SiteConfig>>;

    async fn update_site_config(&self, data: SiteConfig) -> StoreResult<SiteConfig>;

    async fn list_folders(&self) -> StoreResult<Vec<FolderListItem>>;

    async fn create_folder(&self, data: FolderInput) -> StoreResult<FolderListItem>;

    async fn update_folder(&self, data: FolderListItem) -> StoreResult<FolderListItem>;

    async fn delete_folder(&self, id: &str) -> StoreResult<()>;
}
