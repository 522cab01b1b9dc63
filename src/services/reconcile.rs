//! Reconciliation service for repairing batch counters and sweeping orphans.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use crate::config::ReconciliationSettings;
use crate::db::DbPool;
use crate::error::AppResult;

/// Start the reconciliation background task.
///
/// Spawns a tokio task that periodically recounts batch status counters
/// from the live records and deletes records whose batch no longer exists.
/// An interval of 0 disables the task entirely.
pub fn start_reconciliation_task(pool: Arc<DbPool>, settings: ReconciliationSettings) {
    if settings.interval_secs == 0 {
        info!("Reconciliation disabled (interval is 0)");
        return;
    }

    tokio::spawn(async move {
        info!(
            "Starting reconciliation service (interval: {} seconds, orphan grace: {} seconds)",
            settings.interval_secs, settings.orphan_grace_secs
        );

        let mut ticker = interval(Duration::from_secs(settings.interval_secs));

        loop {
            ticker.tick().await;

            if let Err(e) = run_reconciliation(&pool, &settings).await {
                error!("Reconciliation cycle error: {}", e);
            }
        }
    });
}

/// Run a single reconciliation cycle.
pub async fn run_reconciliation(
    pool: &DbPool,
    settings: &ReconciliationSettings,
) -> AppResult<()> {
    // 1. Rewrite cached batch counters that no longer match their records
    let drifted = pool.find_counter_drift().await?;

    let mut repaired = 0;
    let mut errors = 0;

    for drift in &drifted {
        match pool.set_batch_counters(drift).await {
            Ok(()) => {
                warn!(
                    "Batch {} counters drifted; rewritten from live records",
                    drift.batch_id
                );
                repaired += 1;
            }
            Err(e) => {
                warn!("Failed to rewrite counters for batch {}: {}", drift.batch_id, e);
                errors += 1;
            }
        }
    }

    // 2. Delete records left behind by a removed batch, after the grace period
    let swept = pool.sweep_orphan_records(settings.orphan_grace_secs).await?;

    if repaired > 0 || errors > 0 || swept > 0 {
        info!(
            "Reconciliation: {} batch counters rewritten, {} errors, {} orphan records deleted",
            repaired, errors, swept
        );
    }

    Ok(())
}
