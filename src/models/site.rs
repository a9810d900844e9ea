//! Site Models
//!
//! Singleton site configuration and the version check result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

/// Fixed id of the site configuration row.
pub const SITE_CONFIG_ID: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default = "default_config_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_og_image: Option<String>,
    #[serde(default)]
    pub site_icon: Option<String>,
    #[serde(default)]
    pub login_page_background: Option<String>,
    #[serde(default)]
    pub login_page_custom_image: Option<String>,
    #[serde(default)]
    pub enable_diffs: bool,
    #[serde(default)]
    pub diff_per_page: u32,
    #[serde(default)]
    pub grid_items: Vec<String>,
    #[serde(default)]
    pub enable_mailer: bool,
    #[serde(default)]
    pub hide_default_index: bool,
}

fn default_config_id() -> String {
    SITE_CONFIG_ID.to_string()
}

impl SiteConfig {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: default_config_id(),
            title: title.into(),
            description: description.into(),
            default_og_image: None,
            site_icon: None,
            login_page_background: None,
            login_page_custom_image: None,
            enable_diffs: false,
            diff_per_page: 10,
            grid_items: Vec::new(),
            enable_mailer: false,
            hide_default_index: false,
        }
    }
}

/// Latest published version, as last seen on the package registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    pub last_cache_update: DateTime<Utc>,
}

impl From<CacheEntry<String>> for VersionInfo {
    fn from(entry: CacheEntry<String>) -> Self {
        let last_cache_update = entry.last_cache_update();
        Self {
            version: entry.into_data(),
            last_cache_update,
        }
    }
}
