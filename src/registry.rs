//! Package Registry Client
//!
//! Looks up the latest published version of a package. This is the only
//! outbound network call the cache makes, and the only one with its own
//! timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Requests to the registry are aborted after this long.
pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request timed out after {0:?}")]
    Timeout(Duration),
    #[error("registry request failed: {0}")]
    Request(String),
    #[error("registry answered with status {0}")]
    Status(u16),
    #[error("registry response was not understood: {0}")]
    InvalidBody(String),
}

/// Source of the latest published version string.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn latest_version(&self) -> Result<String, RegistryError>;
}

/// Always answers with the same version; used when the registry is pinned
/// or unreachable by configuration.
#[derive(Debug, Clone)]
pub struct FixedVersion(String);

impl FixedVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }
}

#[async_trait]
impl VersionSource for FixedVersion {
    async fn latest_version(&self) -> Result<String, RegistryError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct DistTagResponse {
    version: String,
}

/// npm-style registry: `GET {base}/{package}/{tag}` answers `{ "version": .. }`.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: Client,
    base_url: String,
    package: String,
    tag: String,
}

impl NpmRegistry {
    pub fn new(
        base_url: impl Into<String>,
        package: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(REGISTRY_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            package: package.into(),
            tag: tag.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Self::new(
            config.registry_url.clone(),
            config.registry_package.clone(),
            config.registry_tag.clone(),
        )
    }

    pub fn url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.package, self.tag)
    }
}

#[async_trait]
impl VersionSource for NpmRegistry {
    async fn latest_version(&self) -> Result<String, RegistryError> {
        let url = self.url();
        debug!(%url, "fetching latest version");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout(REGISTRY_TIMEOUT)
            } else {
                RegistryError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        let body: DistTagResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidBody(e.to_string()))?;
        Ok(body.version)
    }
}
