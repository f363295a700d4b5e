//! Periodic Cleanup Task
//!
//! Background task that runs a cleanup pass at a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cleanup::sweep_stale_pending_users;
use crate::store::DocumentStore;

/// Spawns a background task that periodically removes stale pending users.
///
/// The task sleeps for the interval, runs one pass, logs the outcome and
/// repeats. A failed pass is logged and the next one runs on schedule.
///
/// # Arguments
/// * `store` - Shared document store client
/// * `cleanup_interval_secs` - Interval in seconds between passes
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    store: Arc<dyn DocumentStore>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting periodic cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match sweep_stale_pending_users(store.as_ref(), Utc::now()).await {
                Ok(report) if report.deleted > 0 => {
                    info!("Periodic cleanup: {}", report.message());
                }
                Ok(_) => debug!("Periodic cleanup: no stale pending users found"),
                Err(err) => error!(error = %err, "Error cleaning up pending users"),
            }
        }
    })
}
