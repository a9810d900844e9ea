//! Page Cache
//!
//! Id-keyed page entries with lazy per-entry refresh, bulk loading on a
//! cold cache, and the folder-tree cascades page writes trigger.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::facade::store_error;
use super::state::sort_pages;
use super::{tree, CacheEntry, ContentCache, FolderCache};
use crate::error::{CacheError, Result};
use crate::models::{ContentInput, FolderNode, PageData, PageFilter, PageMeta, PageRecord, PageUpdate};

/// Page reads, writes and invalidation.
///
/// The `_meta` variants return the same entries projected to [`PageMeta`].
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get_page(&self, id: &str) -> Result<CacheEntry<PageRecord>>;

    async fn get_page_by_slug(&self, slug: &str) -> Result<CacheEntry<PageRecord>>;

    /// Every page visible under `filter`, oldest publication first.
    async fn get_all_pages(&self, filter: PageFilter) -> Result<Vec<CacheEntry<PageRecord>>>;

    /// Pages whose parent folder is `folder_id`, visible under `filter`.
    async fn get_folder_pages(
        &self,
        folder_id: &str,
        filter: PageFilter,
    ) -> Result<Vec<CacheEntry<PageRecord>>>;

    async fn create_page(
        &self,
        data: PageData,
        content: ContentInput,
    ) -> Result<CacheEntry<PageRecord>>;

    async fn update_page_by_id(&self, id: &str, update: PageUpdate)
        -> Result<CacheEntry<PageRecord>>;

    /// Like `update_page_by_id`, but only invalidates the folder tree when
    /// the title or parent folder changed.
    async fn update_page_by_slug(
        &self,
        slug: &str,
        update: PageUpdate,
    ) -> Result<CacheEntry<PageRecord>>;

    async fn delete_page(&self, id: &str) -> Result<()>;

    async fn clear_page_by_id(&self, id: &str);

    /// Drops every cached page with this slug.
    async fn clear_page_by_slug(&self, slug: &str);

    /// Drops all pages, the folder tree and the folder list.
    async fn clear_all_pages(&self);

    async fn get_page_meta(&self, id: &str) -> Result<CacheEntry<PageMeta>> {
        Ok(self.get_page(id).await?.map(|p| p.meta))
    }

    async fn get_page_meta_by_slug(&self, slug: &str) -> Result<CacheEntry<PageMeta>> {
        Ok(self.get_page_by_slug(slug).await?.map(|p| p.meta))
    }

    async fn get_all_pages_meta(&self, filter: PageFilter) -> Result<Vec<CacheEntry<PageMeta>>> {
        Ok(into_meta(self.get_all_pages(filter).await?))
    }

    async fn get_folder_pages_meta(
        &self,
        folder_id: &str,
        filter: PageFilter,
    ) -> Result<Vec<CacheEntry<PageMeta>>> {
        Ok(into_meta(self.get_folder_pages(folder_id, filter).await?))
    }
}

fn into_meta(entries: Vec<CacheEntry<PageRecord>>) -> Vec<CacheEntry<PageMeta>> {
    entries.into_iter().map(|e| e.map(|p| p.meta)).collect()
}

fn wrap_sorted(records: Vec<PageRecord>) -> Vec<CacheEntry<PageRecord>> {
    let mut entries: Vec<_> = records.into_iter().map(CacheEntry::new).collect();
    sort_pages(&mut entries);
    entries
}

fn not_found(operation: &'static str, what: impl std::fmt::Display) -> CacheError {
    CacheError::new(operation, format!("page {what} not found"))
}

impl ContentCache {
    async fn current_tree(&self) -> Result<Vec<FolderNode>> {
        Ok(self.get_folder_tree().await?.into_data())
    }

    async fn fetch_page(
        &self,
        operation: &'static str,
        id: &str,
        tree: &[FolderNode],
    ) -> Result<PageRecord> {
        self.store
            .get_page_by_id(id, tree)
            .await
            .map_err(store_error(operation))?
            .ok_or_else(|| not_found(operation, format!("`{id}`")))
    }

    /// Refetches the expired pages in `scope`; pages gone from the store
    /// are dropped.
    async fn refresh_expired(
        &self,
        operation: &'static str,
        scope: impl Fn(&PageRecord) -> bool + Send,
    ) -> Result<()> {
        let expired = self
            .state
            .read()
            .await
            .expired_page_ids(self.lifetime(), &scope);
        if expired.is_empty() {
            return Ok(());
        }

        debug!(count = expired.len(), "refreshing expired pages");
        let tree = self.current_tree().await?;
        for id in expired {
            let fresh = self
                .store
                .get_page_by_id(&id, &tree)
                .await
                .map_err(store_error(operation))?;
            let mut state = self.state.write().await;
            match fresh {
                Some(record) => state.put_page(CacheEntry::new(record)),
                None => {
                    state.remove_page(&id);
                }
            }
        }
        Ok(())
    }

    async fn apply_page_update(
        &self,
        operation: &'static str,
        id: String,
        update: PageUpdate,
    ) -> Result<CacheEntry<PageRecord>> {
        let previous = if self.is_enabled() {
            self.state.read().await.pages.get(&id).map(|e| {
                (
                    e.data().title().to_string(),
                    e.data().parent_folder().map(str::to_string),
                )
            })
        } else {
            None
        };
        // Without a cached copy there is nothing to compare against.
        let structural = match &previous {
            Some((title, parent)) => {
                *title != update.data.title || *parent != update.data.parent_folder
            }
            None => true,
        };

        self.store
            .update_page(&id, update.data)
            .await
            .map_err(store_error(operation))?;
        if let Some(content) = update.content {
            self.store
                .update_page_content(&id, content)
                .await
                .map_err(store_error(operation))?;
        }

        if self.is_enabled() {
            let mut state = self.state.write().await;
            if structural {
                debug!(id = %id, "structural page change, invalidating folder tree");
                state.clear_folder_tree();
            } else {
                state.page_folder_trees.clear();
            }
        }

        let tree = self.current_tree().await?;
        let record = self.fetch_page(operation, &id, &tree).await?;
        Ok(self.remember_page(record).await)
    }
}

#[async_trait]
impl PageCache for ContentCache {
    async fn get_page(&self, id: &str) -> Result<CacheEntry<PageRecord>> {
        if self.is_enabled() {
            let cached = self.state.write().await.fresh_page(id, self.lifetime());
            if let Some(entry) = cached {
                debug!(id, "page cache hit");
                return Ok(entry);
            }
        }

        let tree = self.current_tree().await?;
        let record = self.fetch_page("get_page", id, &tree).await?;
        Ok(self.remember_page(record).await)
    }

    async fn get_page_by_slug(&self, slug: &str) -> Result<CacheEntry<PageRecord>> {
        const OP: &str = "get_page_by_slug";
        if self.is_enabled() {
            let cached = self
                .state
                .write()
                .await
                .fresh_page_by_slug(slug, self.lifetime());
            if let Some(entry) = cached {
                debug!(slug, "page cache hit");
                return Ok(entry);
            }
        }

        let tree = self.current_tree().await?;
        let record = self
            .store
            .get_page_by_slug(slug, &tree)
            .await
            .map_err(store_error(OP))?
            .ok_or_else(|| not_found(OP, format!("with slug `{slug}`")))?;
        Ok(self.remember_page(record).await)
    }

    async fn get_all_pages(&self, filter: PageFilter) -> Result<Vec<CacheEntry<PageRecord>>> {
        const OP: &str = "get_all_pages";
        if !self.is_enabled() {
            let tree = self.current_tree().await?;
            let records = self
                .store
                .list_pages(filter, &tree)
                .await
                .map_err(store_error(OP))?;
            return Ok(wrap_sorted(records));
        }

        let complete = self.state.read().await.pages_complete;
        if complete {
            self.state.write().await.stats.record_hit();
            self.refresh_expired(OP, |_| true).await?;
        } else {
            let tree = self.current_tree().await?;
            let records = self
                .store
                .list_pages(PageFilter::all(), &tree)
                .await
                .map_err(store_error(OP))?;
            info!(count = records.len(), "bulk loaded pages");

            let mut state = self.state.write().await;
            state.stats.record_miss();
            state.replace_pages(records.into_iter().map(CacheEntry::new));
        }

        Ok(self
            .state
            .read()
            .await
            .pages_matching(|p| filter.admits(&p.meta)))
    }

    async fn get_folder_pages(
        &self,
        folder_id: &str,
        filter: PageFilter,
    ) -> Result<Vec<CacheEntry<PageRecord>>> {
        const OP: &str = "get_folder_pages";
        let in_folder = |p: &PageRecord| p.parent_folder() == Some(folder_id);

        if !self.is_enabled() {
            let tree = self.current_tree().await?;
            let records = self
                .store
                .list_pages_by_folder(folder_id, filter, &tree)
                .await
                .map_err(store_error(OP))?;
            return Ok(wrap_sorted(records));
        }

        let complete = self.state.read().await.pages_complete;
        if !complete {
            let tree = self.current_tree().await?;
            let records = self
                .store
                .list_pages_by_folder(folder_id, PageFilter::all(), &tree)
                .await
                .map_err(store_error(OP))?;
            let entries = wrap_sorted(records);

            let mut state = self.state.write().await;
            state.stats.record_miss();
            for entry in &entries {
                state.put_page(entry.clone());
            }
            return Ok(entries
                .into_iter()
                .filter(|e| filter.admits(&e.data().meta))
                .collect());
        }

        self.state.write().await.stats.record_hit();
        self.refresh_expired(OP, in_folder).await?;
        Ok(self
            .state
            .read()
            .await
            .pages_matching(|p| in_folder(p) && filter.admits(&p.meta)))
    }

    async fn create_page(
        &self,
        data: PageData,
        content: ContentInput,
    ) -> Result<CacheEntry<PageRecord>> {
        const OP: &str = "create_page";
        // Rebuild first so the new page's route reflects current folders.
        let tree = self.update_folder_tree().await?.into_data();
        let id = self
            .store
            .create_page(data, content)
            .await
            .map_err(store_error(OP))?;
        let record = self.fetch_page(OP, &id, &tree).await?;
        let entry = CacheEntry::new(record);

        if !self.is_enabled() {
            return Ok(entry);
        }

        let parent_known = entry
            .data()
            .parent_folder()
            .map_or(true, |parent| tree::find_node_by_id(&tree, parent).is_some());
        let inserted = {
            let mut state = self.state.write().await;
            state.put_page(entry.clone());
            parent_known && state.insert_into_page_trees(entry.data())
        };
        if !inserted {
            warn!(
                id = %id,
                parent = ?entry.data().parent_folder(),
                "parent folder missing from folder tree, rebuilding"
            );
            {
                let mut state = self.state.write().await;
                state.clear_folder_tree();
                state.stats.record_fallback_rebuild();
            }
            self.update_folder_tree().await?;
        }

        info!(id = %id, slug = entry.data().slug(), "page created");
        Ok(entry)
    }

    async fn update_page_by_id(
        &self,
        id: &str,
        update: PageUpdate,
    ) -> Result<CacheEntry<PageRecord>> {
        self.apply_page_update("update_page_by_id", id.to_string(), update)
            .await
    }

    async fn update_page_by_slug(
        &self,
        slug: &str,
        update: PageUpdate,
    ) -> Result<CacheEntry<PageRecord>> {
        const OP: &str = "update_page_by_slug";
        let cached_id = if self.is_enabled() {
            self.state.read().await.page_id_for_slug(slug)
        } else {
            None
        };

        let id = match cached_id {
            Some(id) => id,
            None => {
                let tree = self.current_tree().await?;
                self.store
                    .get_page_by_slug(slug, &tree)
                    .await
                    .map_err(store_error(OP))?
                    .ok_or_else(|| not_found(OP, format!("with slug `{slug}`")))?
                    .id()
                    .to_string()
            }
        };

        self.apply_page_update(OP, id, update).await
    }

    async fn delete_page(&self, id: &str) -> Result<()> {
        self.store
            .delete_page(id)
            .await
            .map_err(store_error("delete_page"))?;
        self.clear_all_pages().await;
        info!(id, "page deleted");
        Ok(())
    }

    async fn clear_page_by_id(&self, id: &str) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.write().await;
        if state.remove_page(id) {
            state.pages_complete = false;
        }
    }

    async fn clear_page_by_slug(&self, slug: &str) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.write().await;
        if state.remove_pages_by_slug(slug) > 0 {
            state.pages_complete = false;
        }
    }

    async fn clear_all_pages(&self) {
        if !self.is_enabled() {
            return;
        }
        let mut state = self.state.write().await;
        state.clear_pages();
        state.clear_folder_tree();
        state.clear_folder_list();
        debug!("page, folder tree and folder list caches cleared");
    }
}
