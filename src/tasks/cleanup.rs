//! Expired Entry Reaper
//!
//! Optional background task that reclaims memory held by expired in-process
//! entries. Reads never depend on it: expiry is enforced on access either way.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// # Arguments
/// * `cache` - shared in-process cache
/// * `cleanup_interval_secs` - Interval in seconds between runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::new());
/// let reaper = spawn_reaper_task(cache.clone(), 1);
/// // Later, during shutdown:
/// reaper.abort();
/// ```
pub fn spawn_reaper_task(cache: Arc<MemoryCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting reaper task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!("Reaper: removed {} expired entries", removed);
            } else {
                debug!("Reaper: no expired entries found");
            }
        }
    })
}
