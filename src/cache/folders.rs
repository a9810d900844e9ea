//! Folder Caches
//!
//! The folder forest, its page-annotated variants, and the flat folder
//! list. Folder writes rebuild both projections.

use async_trait::async_trait;
use tracing::{debug, info};

use super::facade::store_error;
use super::state::{FOLDER_LIST_KEY, FOLDER_TREE_KEY};
use super::{tree, CacheEntry, ContentCache, PageCache};
use crate::error::{CacheError, Result};
use crate::models::{FolderInput, FolderListItem, FolderNode, PageFilter};

#[async_trait]
pub trait FolderCache: Send + Sync {
    async fn get_folder_tree(&self) -> Result<CacheEntry<Vec<FolderNode>>>;

    /// Rebuilds the folder tree from the store and replaces the cached one.
    async fn update_folder_tree(&self) -> Result<CacheEntry<Vec<FolderNode>>>;

    async fn clear_folder_tree(&self);

    /// Folder forest with every page visible under `filter` attached.
    async fn get_page_folder_tree(&self, filter: PageFilter)
        -> Result<CacheEntry<Vec<FolderNode>>>;

    async fn get_folder_list(&self) -> Result<CacheEntry<Vec<FolderListItem>>>;

    async fn update_folder_list(&self) -> Result<CacheEntry<Vec<FolderListItem>>>;

    async fn clear_folder_list(&self);

    /// Flat lookup of one folder through the folder list.
    async fn get_folder(&self, id: &str) -> Result<FolderListItem>;

    async fn create_folder(&self, data: FolderInput) -> Result<FolderListItem>;

    async fn update_folder(&self, data: FolderListItem) -> Result<FolderListItem>;

    async fn delete_folder(&self, id: &str) -> Result<()>;
}

impl ContentCache {
    /// Clear tree, rebuild tree, rebuild list.
    async fn rebuild_folder_caches(&self, drop_pages: bool) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        {
            let mut state = self.state.write().await;
            state.clear_folder_tree();
            // Cached routes embed folder names.
            if drop_pages {
                state.clear_pages();
            }
        }
        self.update_folder_tree().await?;
        self.update_folder_list().await?;
        Ok(())
    }
}

#[async_trait]
impl FolderCache for ContentCache {
    async fn get_folder_tree(&self) -> Result<CacheEntry<Vec<FolderNode>>> {
        if self.is_enabled() {
            let cached = self.state.write().await.fresh_folder_tree(self.lifetime());
            if let Some(entry) = cached {
                return Ok(entry);
            }
        }
        self.update_folder_tree().await
    }

    async fn update_folder_tree(&self) -> Result<CacheEntry<Vec<FolderNode>>> {
        let folders = self
            .store
            .list_folders()
            .await
            .map_err(store_error("update_folder_tree"))?;
        let entry = CacheEntry::new(tree::build_folder_tree(&folders));
        debug!(folders = folders.len(), roots = entry.data().len(), "folder tree rebuilt");

        let mut state = self.state.write().await;
        state.stats.record_folder_tree_rebuild();
        if self.is_enabled() {
            state.folder_tree.insert(FOLDER_TREE_KEY, entry.clone());
        }
        Ok(entry)
    }

    async fn clear_folder_tree(&self) {
        if !self.is_enabled() {
            return;
        }
        self.state.write().await.clear_folder_tree();
    }

    async fn get_page_folder_tree(
        &self,
        filter: PageFilter,
    ) -> Result<CacheEntry<Vec<FolderNode>>> {
        if self.is_enabled() {
            let cached = self
                .state
                .write()
                .await
                .fresh_page_folder_tree(filter, self.lifetime());
            if let Some(entry) = cached {
                return Ok(entry);
            }
        }

        let forest = self.get_folder_tree().await?.into_data();
        let pages = self.get_all_pages(filter).await?;
        let entry = CacheEntry::new(tree::attach_pages(
            forest,
            pages.into_iter().map(CacheEntry::into_data),
        ));

        if self.is_enabled() {
            self.state
                .write()
                .await
                .page_folder_trees
                .insert(filter, entry.clone());
        }
        Ok(entry)
    }

    async fn get_folder_list(&self) -> Result<CacheEntry<Vec<FolderListItem>>> {
        if self.is_enabled() {
            let cached = self.state.write().await.fresh_folder_list(self.lifetime());
            if let Some(entry) = cached {
                return Ok(entry);
            }
        }
        self.update_folder_list().await
    }

    async fn update_folder_list(&self) -> Result<CacheEntry<Vec<FolderListItem>>> {
        let folders = self
            .store
            .list_folders()
            .await
            .map_err(store_error("update_folder_list"))?;
        let entry = CacheEntry::new(folders);

        let mut state = self.state.write().await;
        state.stats.record_folder_list_rebuild();
        if self.is_enabled() {
            state.folder_list.insert(FOLDER_LIST_KEY, entry.clone());
        }
        Ok(entry)
    }

    async fn clear_folder_list(&self) {
        if !self.is_enabled() {
            return;
        }
        self.state.write().await.clear_folder_list();
    }

    async fn get_folder(&self, id: &str) -> Result<FolderListItem> {
        self.get_folder_list()
            .await?
            .into_data()
            .into_iter()
            .find(|folder| folder.id == id)
            .ok_or_else(|| CacheError::new("get_folder", format!("folder `{id}` not found")))
    }

    async fn create_folder(&self, data: FolderInput) -> Result<FolderListItem> {
        let folder = self
            .store
            .create_folder(data)
            .await
            .map_err(store_error("create_folder"))?;
        self.rebuild_folder_caches(false).await?;
        info!(id = %folder.id, name = %folder.name, "folder created");
        Ok(folder)
    }

    async fn update_folder(&self, data: FolderListItem) -> Result<FolderListItem> {
        let folder = self
            .store
            .update_folder(data)
            .await
            .map_err(store_error("update_folder"))?;
        self.rebuild_folder_caches(true).await?;
        info!(id = %folder.id, name = %folder.name, "folder updated");
        Ok(folder)
    }

    async fn delete_folder(&self, id: &str) -> Result<()> {
        self.store
            .delete_folder(id)
            .await
            .map_err(store_error("delete_folder"))?;
        self.rebuild_folder_caches(true).await?;
        info!(id, "folder deleted");
        Ok(())
    }
}
