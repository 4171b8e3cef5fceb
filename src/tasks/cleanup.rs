//! Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! expired rate-limit windows. Only spawned in the server profile.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::governor::RequestGovernor;

/// Spawns a background task that sweeps the cache and prunes governor
/// windows every `interval`.
///
/// Each pass takes each lock once and releases it before sleeping again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.cache.clone(), state.governor.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: SharedCache,
    governor: RequestGovernor,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep();
            let pruned = governor.prune();

            if removed > 0 || pruned > 0 {
                info!(
                    "Sweep: removed {} expired entries, pruned {} rate-limit windows",
                    removed, pruned
                );
            } else {
                debug!("Sweep: nothing expired");
            }
        }
    })
}
