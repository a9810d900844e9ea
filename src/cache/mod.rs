//! Cache Module
//!
//! Per-entity content caches with TTL expiration, cascading invalidation
//! and a folder forest rebuilt from flat folder rows.

mod entry;
mod facade;
mod folders;
mod pages;
mod site;
mod state;
mod stats;
pub mod tree;


// Re-export public types
pub use entry::{is_expired, CacheEntry};
pub use facade::ContentCache;
pub use folders::FolderCache;
pub use pages::PageCache;
pub use site::{ConfigCache, VersionCache};
pub use stats::CacheStats;
