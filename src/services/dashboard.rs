//! Dashboard aggregation.
//!
//! Works entirely off the cached counters on `upload_batches`, so the cost
//! scales with the number of uploads, never with vehicle rows. This is
//! also the display boundary: the tenant's data_multiplier is applied
//! here, exactly once, and raw counts leave the service no other way.

use crate::db::DbPool;
use crate::db::partition::TenantScope;
use crate::db::upload_batches::BatchRollup;
use crate::error::AppResult;
use crate::models::{ClassStats, DashboardResponse, StatusCounts, VEHICLE_CLASSES};

/// Assemble the tenant dashboard.
pub async fn build_dashboard(pool: &DbPool, scope: &TenantScope) -> AppResult<DashboardResponse> {
    let rollups = pool.batch_rollups(scope).await?;
    let clients = pool
        .list_clients(scope)
        .await?
        .into_iter()
        .map(|client| client.name)
        .collect();

    Ok(assemble(&rollups, clients, scope.data_multiplier()))
}

/// Build the response from per-class rollups.
///
/// Record and rejected-row counts are multiplied; batch counts are event
/// counts and stay raw. Classes with no uploads still appear with zeros,
/// in canonical class order.
fn assemble(rollups: &[BatchRollup], clients: Vec<String>, multiplier: i64) -> DashboardResponse {
    let mut classes = Vec::with_capacity(VEHICLE_CLASSES.len());
    let mut overall_raw = StatusCounts::default();
    let mut batches_total = 0i64;
    let mut rejected_raw = 0i64;

    for class in VEHICLE_CLASSES {
        let rollup = rollups
            .iter()
            .find(|r| r.vehicle_class == class.as_str());

        let raw = match rollup {
            Some(r) => StatusCounts {
                pending: r.pending,
                hold: r.hold,
                in_yard: r.in_yard,
                released: r.released,
                cancelled: r.cancelled,
            },
            None => StatusCounts::default(),
        };
        let batches = rollup.map(|r| r.batches).unwrap_or(0);
        let rejected = rollup.map(|r| r.rejected_rows).unwrap_or(0);

        accumulate(&mut overall_raw, &raw);
        batches_total += batches;
        rejected_raw += rejected;

        let statuses = raw.scaled(multiplier);
        classes.push(ClassStats {
            vehicle_class: class,
            total_records: statuses.total(),
            statuses,
            batches,
            rejected_rows: rejected * multiplier,
        });
    }

    let statuses = overall_raw.scaled(multiplier);

    DashboardResponse {
        total_records: statuses.total(),
        statuses,
        classes,
        batches: batches_total,
        rejected_rows: rejected_raw * multiplier,
        clients,
    }
}

fn accumulate(total: &mut StatusCounts, part: &StatusCounts) {
    total.pending += part.pending;
    total.hold += part.hold;
    total.in_yard += part.in_yard;
    total.released += part.released;
    total.cancelled += part.cancelled;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleClass;

    fn rollup(class: &str, batches: i64, rejected: i64, pending: i64, hold: i64) -> BatchRollup {
        BatchRollup {
            vehicle_class: class.to_string(),
            batches,
            rejected_rows: rejected,
            pending,
            hold,
            in_yard: 0,
            released: 0,
            cancelled: 0,
        }
    }

    #[test]
    fn test_multiplier_applies_to_records_not_batches() {
        let rollups = vec![rollup("two_wheeler", 3, 5, 100, 20)];
        let dashboard = assemble(&rollups, vec![], 4);

        assert_eq!(dashboard.total_records, 480);
        assert_eq!(dashboard.statuses.pending, 400);
        assert_eq!(dashboard.statuses.hold, 80);
        assert_eq!(dashboard.rejected_rows, 20);
        // Upload events are not display counts.
        assert_eq!(dashboard.batches, 3);
    }

    #[test]
    fn test_all_classes_present_in_canonical_order() {
        let rollups = vec![rollup("commercial", 1, 0, 10, 0)];
        let dashboard = assemble(&rollups, vec![], 1);

        assert_eq!(dashboard.classes.len(), 3);
        assert_eq!(dashboard.classes[0].vehicle_class, VehicleClass::TwoWheeler);
        assert_eq!(dashboard.classes[1].vehicle_class, VehicleClass::FourWheeler);
        assert_eq!(dashboard.classes[2].vehicle_class, VehicleClass::Commercial);
        assert_eq!(dashboard.classes[0].total_records, 0);
        assert_eq!(dashboard.classes[2].total_records, 10);
    }

    #[test]
    fn test_identity_multiplier_leaves_counts_raw() {
        let rollups = vec![
            rollup("two_wheeler", 2, 1, 50, 5),
            rollup("four_wheeler", 1, 0, 30, 0),
        ];
        let dashboard = assemble(&rollups, vec!["HDFC".to_string()], 1);

        assert_eq!(dashboard.total_records, 85);
        assert_eq!(dashboard.batches, 3);
        assert_eq!(dashboard.rejected_rows, 1);
        assert_eq!(dashboard.clients, vec!["HDFC".to_string()]);
    }
}
