//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default lifetime of page, folder and site config entries (5 minutes).
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Default lifetime of the version entry (30 minutes).
pub const DEFAULT_VERSION_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Settings the cache itself reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Global switch; when false every read goes straight to the store
    pub enabled: bool,
    /// TTL for pages, folders and site config
    pub lifetime: Duration,
    /// TTL for the registry version lookup
    pub version_lifetime: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lifetime: DEFAULT_LIFETIME,
            version_lifetime: DEFAULT_VERSION_LIFETIME,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache: CacheConfig,
    /// Package registry base URL
    pub registry_url: String,
    /// Package whose latest version is tracked
    pub registry_package: String,
    /// Dist-tag looked up on the registry
    pub registry_tag: String,
    /// HTTP server port
    pub server_port: u16,
    /// Interval between background version refreshes
    pub version_refresh_interval: Duration,
    /// Optional JSON snapshot loaded into the in-memory store
    pub seed_path: Option<PathBuf>,
    /// When set, reported as the latest version instead of asking the registry
    pub pinned_version: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Global cache switch (default: true)
    /// - `CACHE_LIFETIME` - General TTL, e.g. `5m` (default: 5m)
    /// - `VERSION_CACHE_LIFETIME` - Version TTL (default: 30m)
    /// - `REGISTRY_URL` - Registry base URL (default: https://registry.npmjs.org)
    /// - `REGISTRY_PACKAGE` - Package name (default: studiocms)
    /// - `REGISTRY_TAG` - Dist-tag (default: latest)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `VERSION_REFRESH_INTERVAL` - Seconds between version refreshes (default: 1800)
    /// - `SEED_PATH` - JSON store snapshot (default: unset)
    /// - `PINNED_VERSION` - Skip the registry and report this version (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                enabled: env::var("CACHE_ENABLED")
                    .ok()
                    .and_then(|v| parse_bool(&v))
                    .unwrap_or(defaults.cache.enabled),
                lifetime: env::var("CACHE_LIFETIME")
                    .ok()
                    .and_then(|v| parse_lifetime(&v))
                    .unwrap_or(defaults.cache.lifetime),
                version_lifetime: env::var("VERSION_CACHE_LIFETIME")
                    .ok()
                    .and_then(|v| parse_lifetime(&v))
                    .unwrap_or(defaults.cache.version_lifetime),
            },
            registry_url: env::var("REGISTRY_URL").unwrap_or(defaults.registry_url),
            registry_package: env::var("REGISTRY_PACKAGE").unwrap_or(defaults.registry_package),
            registry_tag: env::var("REGISTRY_TAG").unwrap_or(defaults.registry_tag),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            version_refresh_interval: env::var("VERSION_REFRESH_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.version_refresh_interval),
            seed_path: env::var("SEED_PATH").ok().map(PathBuf::from),
            pinned_version: env::var("PINNED_VERSION")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            registry_url: "https://registry.npmjs.org".to_string(),
            registry_package: "studiocms".to_string(),
            registry_tag: "latest".to_string(),
            server_port: 3000,
            version_refresh_interval: Duration::from_secs(1800),
            seed_path: None,
            pinned_version: None,
        }
    }
}

// == Parsing Helpers ==
/// Parses a lifetime such as `500ms`, `30s`, `5m` or `1h`.
///
/// A bare number is read as milliseconds.
pub fn parse_lifetime(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (amount, unit) = raw.split_at(split);
    let amount: u64 = amount.parse().ok()?;

    match unit.trim() {
        "" | "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(amount.checked_mul(3600)?)),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.lifetime, Duration::from_secs(300));
        assert_eq!(config.cache.version_lifetime, Duration::from_secs(1800));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.registry_package, "studiocms");
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_ENABLED");
        env::remove_var("CACHE_LIFETIME");
        env::remove_var("VERSION_CACHE_LIFETIME");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_parse_lifetime_units() {
        assert_eq!(parse_lifetime("250"), Some(Duration::from_millis(250)));
        assert_eq!(parse_lifetime("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_lifetime("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_lifetime("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_lifetime(" 2h "), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn test_parse_lifetime_rejects_garbage() {
        assert_eq!(parse_lifetime(""), None);
        assert_eq!(parse_lifetime("m"), None);
        assert_eq!(parse_lifetime("5 days"), None);
        assert_eq!(parse_lifetime("-5m"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_disabled_keeps_lifetimes() {
        let config = CacheConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.lifetime, DEFAULT_LIFETIME);
    }
}
