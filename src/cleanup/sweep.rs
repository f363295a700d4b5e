//! Cleanup Sweep
//!
//! One pass over the pending user collection.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cleanup::{PENDING_USERS_COLLECTION, STALE_AFTER_MS};
use crate::error::{CleanupError, Result};
use crate::models::CleanupReport;
use crate::store::DocumentStore;

/// Returns the cutoff instant, in Unix milliseconds, for a pass started at `now`.
pub fn cutoff(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis() - STALE_AFTER_MS
}

// == Sweep ==
/// Deletes every pending user that registered before the cutoff.
///
/// All registration times are read before the first delete is issued, so a
/// malformed record fails the pass without side effects. Deletes are then
/// dispatched together and awaited as one batch; only the ones that
/// completed are counted. A failed delete is logged and skipped.
///
/// # Errors
/// - `CleanupError::Retrieval` if the snapshot cannot be fetched
/// - `CleanupError::RecordRead` if any record lacks a readable timestamp
pub async fn sweep_stale_pending_users(
    store: &dyn DocumentStore,
    now: DateTime<Utc>,
) -> Result<CleanupReport> {
    let cutoff = cutoff(now);

    let snapshot = store
        .list_all(PENDING_USERS_COLLECTION)
        .await
        .map_err(CleanupError::Retrieval)?;

    let mut stale = Vec::new();
    for document in &snapshot {
        let registered_at =
            document
                .registration_time_ms()
                .map_err(|source| CleanupError::RecordRead {
                    id: document.id.clone(),
                    source,
                })?;

        // Strictly older: a record exactly at the cutoff survives
        if registered_at < cutoff {
            stale.push(document.id.as_str());
        }
    }

    let outcomes = join_all(stale.iter().map(|id| async move {
        let outcome = store.delete_by_id(PENDING_USERS_COLLECTION, id).await;
        (*id, outcome)
    }))
    .await;

    let mut report = CleanupReport {
        scanned: snapshot.len(),
        ..CleanupReport::default()
    };
    for (id, outcome) in outcomes {
        match outcome {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                warn!(id, error = %err, "Failed to delete pending user");
                report.failed += 1;
            }
        }
    }

    if report.deleted > 0 || report.failed > 0 {
        info!(
            "Cleanup pass: scanned {}, deleted {}, failed {}",
            report.scanned, report.deleted, report.failed
        );
    } else {
        debug!("Cleanup pass: no stale pending users among {}", report.scanned);
    }

    Ok(report)
}
