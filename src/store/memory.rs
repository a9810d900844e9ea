//! In-memory store adapter.
//!
//! Holds every table in process memory, resolves page relations the way a
//! relational store would, and counts calls per operation so callers can
//! observe how often the cache reaches through to it.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{StoreAdapter, StoreError, StoreResult};
use crate::cache::tree;
use crate::lock::{mutex_lock, rw_read, rw_write};
use crate::models::{
    ContentInput, FolderInput, FolderListItem, FolderNode, PageContent, PageData, PageFilter,
    PageMeta, PageRecord, SiteConfig, Taxonomy, UserSummary, SITE_CONFIG_ID,
};

/// A stored page row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRow {
    pub id: String,
    #[serde(flatten)]
    pub data: PageData,
}

/// A stored content block belonging to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    pub id: String,
    pub page_id: String,
    #[serde(flatten)]
    pub content: ContentInput,
}

/// Every table of the in-memory store; also its JSON seed format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub pages: Vec<PageRow>,
    pub contents: Vec<ContentRow>,
    pub folders: Vec<FolderListItem>,
    pub site_config: Option<SiteConfig>,
    pub users: Vec<UserSummary>,
    pub categories: Vec<Taxonomy>,
    pub tags: Vec<Taxonomy>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<StoreSnapshot>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(Self::from_snapshot(serde_json::from_str(json)?))
    }

    /// Loads a JSON snapshot from disk.
    pub async fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        rw_read(&self.tables, "snapshot").clone()
    }

    // == Direct Seeding ==
    // These bypass call counting and failure injection.

    pub fn add_user(&self, user: UserSummary) {
        rw_write(&self.tables, "add_user").users.push(user);
    }

    pub fn add_category(&self, category: Taxonomy) {
        rw_write(&self.tables, "add_category").categories.push(category);
    }

    pub fn add_tag(&self, tag: Taxonomy) {
        rw_write(&self.tables, "add_tag").tags.push(tag);
    }

    pub fn add_folder(&self, folder: FolderListItem) {
        rw_write(&self.tables, "add_folder").folders.push(folder);
    }

    /// Inserts a page row with a known id and one content block.
    pub fn add_page(&self, id: impl Into<String>, data: PageData, content: ContentInput) {
        let id = id.into();
        let mut tables = rw_write(&self.tables, "add_page");
        tables.contents.push(ContentRow {
            id: Uuid::new_v4().to_string(),
            page_id: id.clone(),
            content,
        });
        tables.pages.push(PageRow { id, data });
    }

    pub fn set_site_config(&self, config: SiteConfig) {
        rw_write(&self.tables, "set_site_config").site_config = Some(config);
    }

    // == Call Accounting ==

    /// Number of adapter calls made to `op` so far.
    pub fn call_count(&self, op: &str) -> usize {
        mutex_lock(&self.calls, "call_count")
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        mutex_lock(&self.calls, "total_calls").values().sum()
    }

    pub fn reset_calls(&self) {
        mutex_lock(&self.calls, "reset_calls").clear();
    }

    /// Makes every subsequent call to `op` fail with a backend error.
    pub fn fail_operation(&self, op: &'static str) {
        mutex_lock(&self.failing, "fail_operation").insert(op);
    }

    pub fn restore_operation(&self, op: &str) {
        mutex_lock(&self.failing, "restore_operation").remove(op);
    }

    fn enter(&self, op: &'static str) -> StoreResult<()> {
        *mutex_lock(&self.calls, op).entry(op).or_insert(0) += 1;
        if mutex_lock(&self.failing, op).contains(op) {
            return Err(StoreError::Backend(format!("{op} is unavailable")));
        }
        debug!(op, "store call");
        Ok(())
    }
}

// == Record Resolution ==
fn resolve(tables: &StoreSnapshot, row: &PageRow, tree: &[FolderNode]) -> PageRecord {
    let data = &row.data;
    let find_user = |id: &str| tables.users.iter().find(|u| u.id == id).cloned();

    let multi_lang_content: Vec<PageContent> = tables
        .contents
        .iter()
        .filter(|c| c.page_id == row.id)
        .map(|c| PageContent {
            id: c.id.clone(),
            content_lang: c.content.content_lang.clone(),
            content: c.content.content.clone(),
        })
        .collect();
    let default_content = multi_lang_content
        .iter()
        .find(|c| c.content_lang == data.content_lang)
        .cloned();

    PageRecord {
        meta: PageMeta {
            id: row.id.clone(),
            author: data.author_id.as_deref().and_then(find_user),
            contributors: data
                .contributor_ids
                .iter()
                .filter_map(|id| find_user(id.as_str()))
                .collect(),
            categories: pick(&tables.categories, &data.category_ids),
            tags: pick(&tables.tags, &data.tag_ids),
            url_route: tree::url_route(tree, data.parent_folder.as_deref()),
            data: data.clone(),
        },
        default_content,
        multi_lang_content,
    }
}

fn pick(all: &[Taxonomy], ids: &[i64]) -> Vec<Taxonomy> {
    ids.iter()
        .filter_map(|id| all.iter().find(|t| t.id == *id).cloned())
        .collect()
}

fn visible(filter: PageFilter, record: &PageRecord) -> bool {
    filter.admits(&record.meta)
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn get_page_by_id(
        &self,
        id: &str,
        tree: &[FolderNode],
    ) -> StoreResult<Option<PageRecord>> {
        self.enter("get_page_by_id")?;
        let tables = rw_read(&self.tables, "get_page_by_id");
        Ok(tables
            .pages
            .iter()
            .find(|row| row.id == id)
            .map(|row| resolve(&tables, row, tree)))
    }

    async fn get_page_by_slug(
        &self,
        slug: &str,
        tree: &[FolderNode],
    ) -> StoreResult<Option<PageRecord>> {
        self.enter("get_page_by_slug")?;
        let tables = rw_read(&self.tables, "get_page_by_slug");
        Ok(tables
            .pages
            .iter()
            .find(|row| row.data.slug == slug)
            .map(|row| resolve(&tables, row, tree)))
    }

    async fn list_pages(
        &self,
        filter: PageFilter,
        tree: &[FolderNode],
    ) -> StoreResult<Vec<PageRecord>> {
        self.enter("list_pages")?;
        let tables = rw_read(&self.tables, "list_pages");
        Ok(tables
            .pages
            .iter()
            .map(|row| resolve(&tables, row, tree))
            .filter(|record| visible(filter, record))
            .collect())
    }

    async fn list_pages_by_folder(
        &self,
        folder_id: &str,
        filter: PageFilter,
        tree: &[FolderNode],
    ) -> StoreResult<Vec<PageRecord>> {
        self.enter("list_pages_by_folder")?;
        let tables = rw_read(&self.tables, "list_pages_by_folder");
        Ok(tables
            .pages
            .iter()
            .filter(|row| row.data.parent_folder.as_deref() == Some(folder_id))
            .map(|row| resolve(&tables, row, tree))
            .filter(|record| visible(filter, record))
            .collect())
    }

    async fn create_page(&self, data: PageData, content: ContentInput) -> StoreResult<String> {
        self.enter("create_page")?;
        let id = Uuid::new_v4().to_string();
        self.add_page(id.clone(), data, content);
        Ok(id)
    }

    async fn update_page(&self, id: &str, data: PageData) -> StoreResult<()> {
        self.enter("update_page")?;
        let mut tables = rw_write(&self.tables, "update_page");
        let row = tables
            .pages
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| StoreError::missing("page", id))?;
        row.data = data;
        row.data.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn update_page_content(&self, id: &str, content: ContentInput) -> StoreResult<()> {
        self.enter("update_page_content")?;
        let mut tables = rw_write(&self.tables, "update_page_content");
        if !tables.pages.iter().any(|row| row.id == id) {
            return Err(StoreError::missing("page", id));
        }

        let existing = tables
            .contents
            .iter_mut()
            .find(|c| c.page_id == id && c.content.content_lang == content.content_lang);
        match existing {
            Some(row) => row.content = content,
            None => tables.contents.push(ContentRow {
                id: Uuid::new_v4().to_string(),
                page_id: id.to_string(),
                content,
            }),
        }
        Ok(())
    }

    async fn delete_page(&self, id: &str) -> StoreResult<()> {
        self.enter("delete_page")?;
        let mut tables = rw_write(&self.tables, "delete_page");
        let before = tables.pages.len();
        tables.pages.retain(|row| row.id != id);
        if tables.pages.len() == before {
            return Err(StoreError::missing("page", id));
        }
        tables.contents.retain(|c| c.page_id != id);
        Ok(())
    }

    async fn get_site_config(&self) -> StoreResult<Option<SiteConfig>> {
        self.enter("get_site_config")?;
        Ok(rw_read(&self.tables, "get_site_config").site_config.clone())
    }

    async fn update_site_config(&self, mut data: SiteConfig) -> StoreResult<SiteConfig> {
        self.enter("update_site_config")?;
        data.id = SITE_CONFIG_ID.to_string();
        rw_write(&self.tables, "update_site_config").site_config = Some(data.clone());
        Ok(data)
    }

    async fn list_folders(&self) -> StoreResult<Vec<FolderListItem>> {
        self.enter("list_folders")?;
        Ok(rw_read(&self.tables, "list_folders").folders.clone())
    }

    async fn create_folder(&self, data: FolderInput) -> StoreResult<FolderListItem> {
        self.enter("create_folder")?;
        let folder = FolderListItem {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            parent: data.parent,
        };
        rw_write(&self.tables, "create_folder")
            .folders
            .push(folder.clone());
        Ok(folder)
    }

    async fn update_folder(&self, data: FolderListItem) -> StoreResult<FolderListItem> {
        self.enter("update_folder")?;
        let mut tables = rw_write(&self.tables, "update_folder");
        let row = tables
            .folders
            .iter_mut()
            .find(|f| f.id == data.id)
            .ok_or_else(|| StoreError::missing("folder", data.id.clone()))?;
        *row = data.clone();
        Ok(data)
    }

    async fn delete_folder(&self, id: &str) -> StoreResult<()> {
        self.enter("delete_folder")?;
        let mut tables = rw_write(&self.tables, "delete_folder");
        let before = tables.folders.len();
        tables.folders.retain(|f| f.id != id);
        if tables.folders.len() == before {
            return Err(StoreError::missing("folder", id));
        }
        Ok(())
    }
}
