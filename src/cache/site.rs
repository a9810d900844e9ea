//! Site Config and Version Caches
//!
//! Two singleton entries. The version entry has its own, longer lifetime
//! because refreshing it means calling out to the package registry.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::facade::store_error;
use super::state::{SITE_CONFIG_KEY, VERSION_KEY};
use super::{CacheEntry, ContentCache};
use crate::error::{CacheError, Result};
use crate::models::{SiteConfig, VersionInfo};
use crate::registry::{RegistryError, REGISTRY_TIMEOUT};

#[async_trait]
pub trait ConfigCache: Send + Sync {
    async fn get_site_config(&self) -> Result<CacheEntry<SiteConfig>>;

    /// Writes through to the store, then replaces the cached entry with the
    /// stored result.
    async fn update_site_config(&self, data: SiteConfig) -> Result<CacheEntry<SiteConfig>>;

    async fn clear_site_config(&self);
}

#[async_trait]
pub trait VersionCache: Send + Sync {
    async fn get_version(&self) -> Result<VersionInfo>;

    /// Forces a registry lookup. On failure the last known version is
    /// returned if there is one.
    async fn update_version(&self) -> Result<VersionInfo>;

    async fn clear_version(&self);
}

#[async_trait]
impl ConfigCache for ContentCache {
    async fn get_site_config(&self) -> Result<CacheEntry<SiteConfig>> {
        const OP: &str = "get_site_config";
        if self.is_enabled() {
            let cached = self.state.write().await.fresh_site_config(self.lifetime());
            if let Some(entry) = cached {
                return Ok(entry);
            }
        }

        let config = self
            .store
            .get_site_config()
            .await
            .map_err(store_error(OP))?
            .ok_or_else(|| CacheError::new(OP, "site config not found"))?;
        let entry = CacheEntry::new(config);
        if self.is_enabled() {
            self.state
                .write()
                .await
                .site_config
                .insert(SITE_CONFIG_KEY, entry.clone());
        }
        Ok(entry)
    }

    async fn update_site_config(&self, data: SiteConfig) -> Result<CacheEntry<SiteConfig>> {
        let stored = self
            .store
            .update_site_config(data)
            .await
            .map_err(store_error("update_site_config"))?;
        let entry = CacheEntry::new(stored);
        if self.is_enabled() {
            self.state
                .write()
                .await
                .site_config
                .insert(SITE_CONFIG_KEY, entry.clone());
        }
        debug!("site config updated");
        Ok(entry)
    }

    async fn clear_site_config(&self) {
        if !self.is_enabled() {
            return;
        }
        self.state.write().await.site_config.clear();
    }
}

#[async_trait]
impl VersionCache for ContentCache {
    async fn get_version(&self) -> Result<VersionInfo> {
        if self.is_enabled() {
            let lifetime = self.config.version_lifetime;
            let cached = self.state.write().await.fresh_version(lifetime);
            if let Some(entry) = cached {
                return Ok(entry.into());
            }
        }
        self.update_version().await
    }

    async fn update_version(&self) -> Result<VersionInfo> {
        const OP: &str = "update_version";
        let lookup = tokio::time::timeout(REGISTRY_TIMEOUT, self.registry.latest_version())
            .await
            .unwrap_or(Err(RegistryError::Timeout(REGISTRY_TIMEOUT)));

        match lookup {
            Ok(version) => {
                debug!(%version, "latest version fetched");
                let entry = CacheEntry::new(version);
                if self.is_enabled() {
                    self.state
                        .write()
                        .await
                        .version
                        .insert(VERSION_KEY, entry.clone());
                }
                Ok(entry.into())
            }
            Err(err) => {
                let last_known = if self.is_enabled() {
                    self.state.read().await.version.get(VERSION_KEY).cloned()
                } else {
                    None
                };
                match last_known {
                    Some(entry) => {
                        warn!(error = %err, version = %entry.data(), "version lookup failed, keeping last known version");
                        Ok(entry.into())
                    }
                    None => Err(CacheError::from_source(OP, "latest version lookup failed", err)),
                }
            }
        }
    }

    async fn clear_version(&self) {
        if !self.is_enabled() {
            return;
        }
        self.state.write().await.version.clear();
    }
}
