//! StudioCMS content cache
//!
//! An in-process cache in front of the CMS data store: pages, folders, site
//! configuration and the latest published version, each with TTL expiry
//! and the invalidation cascades their relationships require.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
mod lock;
pub mod models;
pub mod registry;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEntry, ConfigCache, ContentCache, FolderCache, PageCache, VersionCache};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use tasks::spawn_version_refresh_task;
