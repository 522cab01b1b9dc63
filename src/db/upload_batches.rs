//! Database queries for upload batches.
//!
//! The batch row is inserted after its vehicle records, so its presence
//! marks a completed ingestion. The five status counters are a cache over
//! the batch's records, moved by transitions and repaired by reconciliation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::upload_batch::{self, ActiveModel, Entity as UploadBatch};
use crate::error::{AppError, AppResult};
use crate::models::{PaginationParams, VehicleStatus};

use super::DbPool;
use super::partition::{Partition, TenantScope};

/// Counter column backing a status.
fn count_column(status: VehicleStatus) -> &'static str {
    match status {
        VehicleStatus::Pending => "pending_count",
        VehicleStatus::Hold => "hold_count",
        VehicleStatus::InYard => "in_yard_count",
        VehicleStatus::Released => "released_count",
        VehicleStatus::Cancelled => "cancelled_count",
    }
}

/// Finalized ingestion bookkeeping for a new batch row.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_by: String,
    pub source_key: Option<String>,
    pub header_map: JsonValue,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub duplicate_rows: i32,
    pub rejected_rows: i32,
}

/// Per-class aggregation over a tenant's batches.
#[derive(Debug, FromQueryResult)]
pub struct BatchRollup {
    pub vehicle_class: String,
    pub batches: i64,
    pub rejected_rows: i64,
    pub pending: i64,
    pub hold: i64,
    pub in_yard: i64,
    pub released: i64,
    pub cancelled: i64,
}

/// A batch whose cached counters disagree with its records.
#[derive(Debug, FromQueryResult)]
pub struct CounterDrift {
    pub batch_id: Uuid,
    pub pending: i64,
    pub hold: i64,
    pub in_yard: i64,
    pub released: i64,
    pub cancelled: i64,
}

/// Move one unit between two status counters of a batch.
///
/// A single UPDATE so concurrent transitions cannot interleave between a
/// read and a write. Runs on whatever connection the caller holds, usually
/// the transition transaction.
pub(crate) async fn apply_status_delta<C: ConnectionTrait>(
    conn: &C,
    batch_id: Uuid,
    from: VehicleStatus,
    to: VehicleStatus,
) -> AppResult<()> {
    let sql = format!(
        "UPDATE upload_batches SET {from_col} = {from_col} - 1, {to_col} = {to_col} + 1 WHERE id = $1",
        from_col = count_column(from),
        to_col = count_column(to),
    );

    conn.execute_raw(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        &sql,
        [sea_orm::Value::Uuid(Some(batch_id.into()))],
    ))
    .await
    .map_err(|e| AppError::Database(format!("Failed to move batch counters: {}", e)))?;

    Ok(())
}

impl DbPool {
    /// Insert the batch row that finalizes an ingestion.
    ///
    /// All inserted records start as pending, so pending_count opens at
    /// inserted_rows and the other counters at zero.
    pub async fn insert_batch(
        &self,
        partition: &Partition,
        batch: NewBatch,
    ) -> AppResult<upload_batch::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(batch.id),
            tenant_id: Set(partition.tenant_id()),
            vehicle_class: Set(partition.class().as_str().to_string()),
            file_name: Set(batch.file_name),
            uploaded_by: Set(batch.uploaded_by),
            source_key: Set(batch.source_key),
            header_map: Set(batch.header_map),
            total_rows: Set(batch.total_rows),
            inserted_rows: Set(batch.inserted_rows),
            duplicate_rows: Set(batch.duplicate_rows),
            rejected_rows: Set(batch.rejected_rows),
            pending_count: Set(batch.inserted_rows),
            hold_count: Set(0),
            in_yard_count: Set(0),
            released_count: Set(0),
            cancelled_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert batch: {}", e)))?;

        Ok(result)
    }

    /// Get a batch by id within the tenant.
    pub async fn get_batch(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> AppResult<Option<upload_batch::Model>> {
        let result = scope
            .batches()
            .filter(upload_batch::Column::Id.eq(id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get batch: {}", e)))?;

        Ok(result)
    }

    /// List the tenant's batches, newest first, paginated.
    pub async fn list_batches(
        &self,
        scope: &TenantScope,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<upload_batch::Model>, u64)> {
        let select = scope.batches();

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count batches: {}", e)))?;

        let batches = select
            .order_by_desc(upload_batch::Column::CreatedAt)
            .offset(pagination.offset() as u64)
            .limit(pagination.clamped_limit() as u64)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list batches: {}", e)))?;

        Ok((batches, total))
    }

    /// Aggregate batch bookkeeping per vehicle class, one GROUP BY over the
    /// tenant's batches. Never touches vehicle rows.
    pub async fn batch_rollups(&self, scope: &TenantScope) -> AppResult<Vec<BatchRollup>> {
        let sql = "SELECT vehicle_class, \
                   COUNT(*) AS batches, \
                   COALESCE(SUM(rejected_rows), 0) AS rejected_rows, \
                   COALESCE(SUM(pending_count), 0) AS pending, \
                   COALESCE(SUM(hold_count), 0) AS hold, \
                   COALESCE(SUM(in_yard_count), 0) AS in_yard, \
                   COALESCE(SUM(released_count), 0) AS released, \
                   COALESCE(SUM(cancelled_count), 0) AS cancelled \
                   FROM upload_batches WHERE tenant_id = $1 GROUP BY vehicle_class";

        let results = BatchRollup::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [sea_orm::Value::Uuid(Some(scope.tenant_id().into()))],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to aggregate batches: {}", e)))?;

        Ok(results)
    }

    /// Find batches whose cached counters no longer match their records.
    pub async fn find_counter_drift(&self) -> AppResult<Vec<CounterDrift>> {
        let sql = "SELECT b.id AS batch_id, \
                   COALESCE(SUM(CASE WHEN r.status = 'pending' THEN 1 ELSE 0 END), 0) AS pending, \
                   COALESCE(SUM(CASE WHEN r.status = 'hold' THEN 1 ELSE 0 END), 0) AS hold, \
                   COALESCE(SUM(CASE WHEN r.status = 'in_yard' THEN 1 ELSE 0 END), 0) AS in_yard, \
                   COALESCE(SUM(CASE WHEN r.status = 'released' THEN 1 ELSE 0 END), 0) AS released, \
                   COALESCE(SUM(CASE WHEN r.status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled \
                   FROM upload_batches b \
                   LEFT JOIN vehicle_records r ON r.batch_id = b.id \
                   GROUP BY b.id \
                   HAVING b.pending_count <> COALESCE(SUM(CASE WHEN r.status = 'pending' THEN 1 ELSE 0 END), 0) \
                   OR b.hold_count <> COALESCE(SUM(CASE WHEN r.status = 'hold' THEN 1 ELSE 0 END), 0) \
                   OR b.in_yard_count <> COALESCE(SUM(CASE WHEN r.status = 'in_yard' THEN 1 ELSE 0 END), 0) \
                   OR b.released_count <> COALESCE(SUM(CASE WHEN r.status = 'released' THEN 1 ELSE 0 END), 0) \
                   OR b.cancelled_count <> COALESCE(SUM(CASE WHEN r.status = 'cancelled' THEN 1 ELSE 0 END), 0)";

        let results = CounterDrift::find_by_statement(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            sql.to_owned(),
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to detect counter drift: {}", e)))?;

        Ok(results)
    }

    /// Overwrite a batch's cached counters with recounted values.
    pub async fn set_batch_counters(&self, drift: &CounterDrift) -> AppResult<()> {
        let sql = "UPDATE upload_batches SET pending_count = $1, hold_count = $2, \
                   in_yard_count = $3, released_count = $4, cancelled_count = $5 WHERE id = $6";

        self.connection()
            .execute_raw(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                sql,
                [
                    sea_orm::Value::Int(Some(drift.pending as i32)),
                    sea_orm::Value::Int(Some(drift.hold as i32)),
                    sea_orm::Value::Int(Some(drift.in_yard as i32)),
                    sea_orm::Value::Int(Some(drift.released as i32)),
                    sea_orm::Value::Int(Some(drift.cancelled as i32)),
                    sea_orm::Value::Uuid(Some(drift.batch_id.into())),
                ],
            ))
            .await
            .map_err(|e| AppError::Database(format!("Failed to rewrite batch counters: {}", e)))?;

        Ok(())
    }
}
