//! Data Models
//!
//! Content records held by the cache plus the DTOs used by the HTTP surface.

mod folder;
mod page;
mod requests;
mod responses;
mod site;

pub use folder::{FolderInput, FolderListItem, FolderNode};
pub use page::{
    ContentInput, PageContent, PageData, PageFilter, PageMeta, PageRecord, PageUpdate, Taxonomy,
    UserSummary, DEFAULT_INDEX_SLUG,
};
pub use requests::{PageListQuery, PageTreeQuery};
pub use responses::{ClearResponse, DeleteResponse, HealthResponse, StatsResponse};
pub use site::{SiteConfig, VersionInfo, SITE_CONFIG_ID};
