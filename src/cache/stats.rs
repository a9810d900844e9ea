//! Cache Statistics Module
//!
//! Tracks hits, misses and the folder rebuild work done by the cache.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads answered from an unexpired entry
    pub hits: u64,
    /// Reads that had to go to the store or registry
    pub misses: u64,
    /// Full folder tree rebuilds from the store
    pub folder_tree_rebuilds: u64,
    /// Folder list reloads from the store
    pub folder_list_rebuilds: u64,
    /// Page nodes inserted into cached page trees without a rebuild
    pub fast_path_inserts: u64,
    /// Rebuilds forced by a failed fast-path insert
    pub fallback_rebuilds: u64,
    /// Current number of cached pages
    pub page_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.record_hit();
        } else {
            self.record_miss();
        }
    }

    pub fn record_folder_tree_rebuild(&mut self) {
        self.folder_tree_rebuilds += 1;
    }

    pub fn record_folder_list_rebuild(&mut self) {
        self.folder_list_rebuilds += 1;
    }

    pub fn record_fast_path_insert(&mut self) {
        self.fast_path_inserts += 1;
    }

    pub fn record_fallback_rebuild(&mut self) {
        self.fallback_rebuilds += 1;
    }

    pub fn set_page_entries(&mut self, count: usize) {
        self.page_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.folder_tree_rebuilds, 0);
        assert_eq!(stats.page_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(false);
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_rebuild_counters() {
        let mut stats = CacheStats::new();
        stats.record_folder_tree_rebuild();
        stats.record_folder_tree_rebuild();
        stats.record_folder_list_rebuild();
        stats.record_fast_path_insert();
        stats.record_fallback_rebuild();

        assert_eq!(stats.folder_tree_rebuilds, 2);
        assert_eq!(stats.folder_list_rebuilds, 1);
        assert_eq!(stats.fast_path_inserts, 1);
        assert_eq!(stats.fallback_rebuilds, 1);
    }
}
