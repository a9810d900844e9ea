//! Cache Entry Module
//!
//! The `{ data, lastCacheUpdate }` envelope every cached value is wrapped in,
//! and the expiration policy applied to it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Entry ==
/// An immutable cached value stamped with the time it was cached.
///
/// The timestamp is set once at construction. Updating a cached value means
/// replacing the entry, never mutating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    data: T,
    last_cache_update: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Wraps a value, stamping it with the current wall-clock time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            last_cache_update: Utc::now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timestamp(data: T, last_cache_update: DateTime<Utc>) -> Self {
        Self {
            data,
            last_cache_update,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn last_cache_update(&self) -> DateTime<Utc> {
        self.last_cache_update
    }

    // == Is Expired ==
    /// Checks the entry against a lifetime using the current time.
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.is_expired_at(Utc::now(), lifetime)
    }

    /// Checks the entry against a lifetime at a given instant.
    ///
    /// Expired only once strictly more than `lifetime` has elapsed; an entry
    /// exactly `lifetime` old is still fresh.
    pub fn is_expired_at(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        let age_ms = now
            .signed_duration_since(self.last_cache_update)
            .num_milliseconds();
        let lifetime_ms = i64::try_from(lifetime.as_millis()).unwrap_or(i64::MAX);
        age_ms > lifetime_ms
    }

    /// Applies a projection to the data, keeping the original timestamp.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheEntry<U> {
        CacheEntry {
            data: f(self.data),
            last_cache_update: self.last_cache_update,
        }
    }
}

/// Returns true if more than `ttl_millis` milliseconds have passed since the
/// entry was cached.
pub fn is_expired<T>(entry: &CacheEntry<T>, ttl_millis: u64) -> bool {
    entry.is_expired(Duration::from_millis(ttl_millis))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_new_entry_is_fresh() {
        let entry = CacheEntry::new("home".to_string());

        assert_eq!(entry.data(), "home");
        assert!(!entry.is_expired(Duration::from_secs(60)));
        assert!(!is_expired(&entry, 60_000));
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        let now = Utc::now();
        let entry = CacheEntry::with_timestamp(1u32, now - TimeDelta::milliseconds(1000));

        assert!(!entry.is_expired_at(now, Duration::from_millis(1000)));
        assert!(entry.is_expired_at(now, Duration::from_millis(999)));
    }

    #[test]
    fn test_zero_lifetime_expires_after_any_elapsed_time() {
        let now = Utc::now();
        let entry = CacheEntry::with_timestamp(1u32, now - TimeDelta::milliseconds(1));

        assert!(entry.is_expired_at(now, Duration::ZERO));
        assert!(!CacheEntry::with_timestamp(1u32, now).is_expired_at(now, Duration::ZERO));
    }

    #[test]
    fn test_map_keeps_timestamp() {
        let entry = CacheEntry::new(vec![1, 2, 3]);
        let stamp = entry.last_cache_update();

        let mapped = entry.map(|v| v.len());
        assert_eq!(*mapped.data(), 3);
        assert_eq!(mapped.last_cache_update(), stamp);
    }

    #[test]
    fn test_serializes_camel_case_envelope() {
        let entry = CacheEntry::new("1.0.0");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["data"], "1.0.0");
        assert!(json.get("lastCacheUpdate").is_some());
    }
}
