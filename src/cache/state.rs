//! Cache State
//!
//! The per-entity maps owned by the cache context. Singleton entities live
//! under fixed keys; pages are keyed by id.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{tree, CacheEntry, CacheStats};
use crate::models::{
    FolderListItem, FolderNode, PageFilter, PageRecord, SiteConfig, SITE_CONFIG_ID,
};

pub(crate) const FOLDER_TREE_KEY: &str = "folderTree";
pub(crate) const FOLDER_LIST_KEY: &str = "folderList";
pub(crate) const VERSION_KEY: &str = "latestVersion";
pub(crate) const SITE_CONFIG_KEY: &str = SITE_CONFIG_ID;

#[derive(Debug, Default)]
pub(crate) struct CacheState {
    pub(crate) pages: HashMap<String, CacheEntry<PageRecord>>,
    /// Set once a bulk load has put every stored page in `pages`
    pub(crate) pages_complete: bool,
    pub(crate) site_config: HashMap<&'static str, CacheEntry<SiteConfig>>,
    pub(crate) version: HashMap<&'static str, CacheEntry<String>>,
    pub(crate) folder_tree: HashMap<&'static str, CacheEntry<Vec<FolderNode>>>,
    pub(crate) page_folder_trees: HashMap<PageFilter, CacheEntry<Vec<FolderNode>>>,
    pub(crate) folder_list: HashMap<&'static str, CacheEntry<Vec<FolderListItem>>>,
    pub(crate) stats: CacheStats,
}

fn fresh<K, Q, T>(map: &HashMap<K, CacheEntry<T>>, key: &Q, lifetime: Duration) -> Option<CacheEntry<T>>
where
    K: Borrow<Q> + Eq + Hash,
    Q: Eq + Hash + ?Sized,
    T: Clone,
{
    map.get(key).filter(|e| !e.is_expired(lifetime)).cloned()
}

impl CacheState {
    // == Lookups ==
    // Each records a hit or a miss.

    pub(crate) fn fresh_page(&mut self, id: &str, lifetime: Duration) -> Option<CacheEntry<PageRecord>> {
        let found = fresh(&self.pages, id, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Pages are keyed by id, so slug lookups scan the cached values.
    pub(crate) fn fresh_page_by_slug(
        &mut self,
        slug: &str,
        lifetime: Duration,
    ) -> Option<CacheEntry<PageRecord>> {
        let found = self
            .pages
            .values()
            .find(|e| e.data().slug() == slug)
            .filter(|e| !e.is_expired(lifetime))
            .cloned();
        self.stats.record_lookup(found.is_some());
        found
    }

    pub(crate) fn fresh_folder_tree(&mut self, lifetime: Duration) -> Option<CacheEntry<Vec<FolderNode>>> {
        let found = fresh(&self.folder_tree, FOLDER_TREE_KEY, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub(crate) fn fresh_page_folder_tree(
        &mut self,
        filter: PageFilter,
        lifetime: Duration,
    ) -> Option<CacheEntry<Vec<FolderNode>>> {
        let found = fresh(&self.page_folder_trees, &filter, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub(crate) fn fresh_folder_list(
        &mut self,
        lifetime: Duration,
    ) -> Option<CacheEntry<Vec<FolderListItem>>> {
        let found = fresh(&self.folder_list, FOLDER_LIST_KEY, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub(crate) fn fresh_site_config(&mut self, lifetime: Duration) -> Option<CacheEntry<SiteConfig>> {
        let found = fresh(&self.site_config, SITE_CONFIG_KEY, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub(crate) fn fresh_version(&mut self, lifetime: Duration) -> Option<CacheEntry<String>> {
        let found = fresh(&self.version, VERSION_KEY, lifetime);
        self.stats.record_lookup(found.is_some());
        found
    }

    // == Pages ==

    pub(crate) fn page_id_for_slug(&self, slug: &str) -> Option<String> {
        self.pages
            .values()
            .find(|e| e.data().slug() == slug)
            .map(|e| e.data().id().to_string())
    }

    pub(crate) fn put_page(&mut self, entry: CacheEntry<PageRecord>) {
        self.pages.insert(entry.data().id().to_string(), entry);
    }

    /// Replaces the whole page map with a bulk load.
    pub(crate) fn replace_pages(&mut self, entries: impl IntoIterator<Item = CacheEntry<PageRecord>>) {
        self.pages = entries
            .into_iter()
            .map(|e| (e.data().id().to_string(), e))
            .collect();
        self.pages_complete = true;
    }

    pub(crate) fn remove_page(&mut self, id: &str) -> bool {
        self.pages.remove(id).is_some()
    }

    pub(crate) fn remove_pages_by_slug(&mut self, slug: &str) -> usize {
        let before = self.pages.len();
        self.pages.retain(|_, e| e.data().slug() != slug);
        before - self.pages.len()
    }

    pub(crate) fn clear_pages(&mut self) {
        self.pages.clear();
        self.pages_complete = false;
    }

    pub(crate) fn expired_page_ids(
        &self,
        lifetime: Duration,
        scope: impl Fn(&PageRecord) -> bool,
    ) -> Vec<String> {
        self.pages
            .iter()
            .filter(|(_, e)| scope(e.data()) && e.is_expired(lifetime))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Cached pages matching `keep`, oldest publication first.
    pub(crate) fn pages_matching(
        &self,
        keep: impl Fn(&PageRecord) -> bool,
    ) -> Vec<CacheEntry<PageRecord>> {
        let mut found: Vec<_> = self
            .pages
            .values()
            .filter(|e| keep(e.data()))
            .cloned()
            .collect();
        sort_pages(&mut found);
        found
    }

    // == Folders ==

    /// Drops the folder tree and every page tree derived from it.
    pub(crate) fn clear_folder_tree(&mut self) {
        self.folder_tree.clear();
        self.page_folder_trees.clear();
    }

    pub(crate) fn clear_folder_list(&mut self) {
        self.folder_list.clear();
    }

    /// Fast-path insert of a new page into every cached page tree whose
    /// filter admits it. Returns false if any tree lacks the parent folder.
    pub(crate) fn insert_into_page_trees(&mut self, record: &PageRecord) -> bool {
        let mut all_inserted = true;

        for (filter, cached) in self.page_folder_trees.iter_mut() {
            if !filter.admits(&record.meta) {
                continue;
            }
            let mut forest = cached.data().clone();
            let node = FolderNode::page(record.clone());
            if tree::add_page_to_folder_tree(&mut forest, record.parent_folder(), node) {
                *cached = CacheEntry::new(forest);
                self.stats.record_fast_path_insert();
            } else {
                all_inserted = false;
            }
        }

        all_inserted
    }
}

/// Orders listings by publication date, then id.
pub(crate) fn sort_pages(pages: &mut [CacheEntry<PageRecord>]) {
    pages.sort_by(|a, b| {
        a.data()
            .meta
            .data
            .published_at
            .cmp(&b.data().meta.data.published_at)
            .then_with(|| a.data().id().cmp(b.data().id()))
    });
}
