//! Version Refresh Task
//!
//! Keeps the cached registry version warm so request paths rarely pay for
//! the outbound lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{ContentCache, VersionCache};

/// Spawns a background task that refreshes the cached version every
/// `interval`.
///
/// A failed refresh is logged and retried on the next tick; the previous
/// value stays cached. The returned handle is aborted on shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_version_refresh_task(cache.clone(), Duration::from_secs(1800));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_version_refresh_task(cache: Arc<ContentCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "starting version refresh task"
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.update_version().await {
                Ok(info) => debug!(version = %info.version, "version refreshed"),
                Err(err) => warn!(error = %err, "version refresh failed"),
            }
        }
    })
}
