//! Database queries for vehicle records.
//!
//! Records are written in chunks during ingestion and then only ever change
//! through `transition_record`, which couples the status column, the audit
//! trail and the batch counters inside one transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Statement, TransactionTrait,
};
use serde_json::Value as JsonValue;
use tracing::warn;
use uuid::Uuid;

use crate::entity::status_event::{self, Entity as StatusEvent};
use crate::entity::vehicle_record::{self, ActiveModel, Entity as VehicleRecord};
use crate::error::{AppError, AppResult};
use crate::models::{StagedRecord, VehicleStatus};

use super::DbPool;
use super::partition::{Partition, TenantScope};
use super::upload_batches::apply_status_delta;

/// Version-conflict retries before a transition gives up.
const TRANSITION_MAX_ATTEMPTS: u32 = 3;

/// A requested status change, validated by the caller for role and yard
/// fields but not yet for FSM legality.
#[derive(Debug, Clone)]
pub struct RecordTransition {
    pub target: VehicleStatus,
    pub yard_name: Option<String>,
    pub yard_location: Option<String>,
    pub actor: String,
    /// Caller may leave a terminal status. Set only for managers that asked
    /// for an override.
    pub allow_override: bool,
}

impl DbPool {
    /// Insert one chunk of staged records into a partition.
    ///
    /// A single multi-row INSERT, so the chunk lands or fails as a unit.
    /// Rows always start out pending with version 1.
    pub async fn insert_records_chunk(
        &self,
        partition: &Partition,
        batch_id: Uuid,
        records: &[StagedRecord],
    ) -> AppResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let models: Vec<ActiveModel> = records
            .iter()
            .map(|staged| ActiveModel {
                id: Set(Uuid::now_v7()),
                tenant_id: Set(partition.tenant_id()),
                vehicle_class: Set(partition.class().as_str().to_string()),
                batch_id: Set(batch_id),
                registration_no: Set(staged.registration_no.clone()),
                chassis_no: Set(staged.chassis_no.clone()),
                engine_no: Set(staged.engine_no.clone()),
                loan_no: Set(staged.loan_no.clone()),
                customer_name: Set(staged.customer_name.clone()),
                bank_name: Set(staged.bank_name.clone()),
                make_model: Set(staged.make_model.clone()),
                branch: Set(staged.branch.clone()),
                emi_amount: Set(staged.emi_amount),
                address: Set(staged.address.clone()),
                extra: Set(if staged.extra.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(staged.extra.clone()))
                }),
                status: Set(VehicleStatus::Pending.as_str().to_string()),
                yard_name: Set(None),
                yard_location: Set(None),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .collect();

        VehicleRecord::insert_many(models)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert record chunk: {}", e)))?;

        Ok(())
    }

    /// Records in a partition whose registration number ends with the given
    /// digits, newest first, capped.
    pub async fn search_records_by_suffix(
        &self,
        partition: &Partition,
        digits: &str,
        cap: u64,
    ) -> AppResult<Vec<vehicle_record::Model>> {
        partition
            .records()
            .filter(vehicle_record::Column::RegistrationNo.like(format!("%{}", digits)))
            .order_by_desc(vehicle_record::Column::CreatedAt)
            .limit(cap)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to search by suffix: {}", e)))
    }

    /// Records in a partition with exactly the given registration number,
    /// newest first, capped.
    pub async fn search_records_by_plate(
        &self,
        partition: &Partition,
        plate: &str,
        cap: u64,
    ) -> AppResult<Vec<vehicle_record::Model>> {
        partition
            .records()
            .filter(vehicle_record::Column::RegistrationNo.eq(plate))
            .order_by_desc(vehicle_record::Column::CreatedAt)
            .limit(cap)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to search by registration: {}", e)))
    }

    /// Fetch one record within the tenant's scope.
    pub async fn get_record(
        &self,
        scope: &TenantScope,
        record_id: Uuid,
    ) -> AppResult<vehicle_record::Model> {
        scope
            .records()
            .filter(vehicle_record::Column::Id.eq(record_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch vehicle record: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle record {}", record_id)))
    }

    /// Full audit trail for a record, oldest first.
    ///
    /// Callers resolve the record through a scope before asking for its
    /// history, so no tenant filter is repeated here.
    pub async fn get_status_history(
        &self,
        record_id: Uuid,
    ) -> AppResult<Vec<status_event::Model>> {
        StatusEvent::find()
            .filter(status_event::Column::RecordId.eq(record_id))
            .order_by_asc(status_event::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch status history: {}", e)))
    }

    /// Apply a status transition to a record.
    ///
    /// Concurrency is handled with the version column: the UPDATE only
    /// matches the version that was read, and a miss means another writer
    /// got there first, so the record is re-read and the transition is
    /// re-validated against its new status. After
    /// `TRANSITION_MAX_ATTEMPTS` misses the caller gets a conflict.
    ///
    /// The status write, the audit event and the batch counter move commit
    /// together or not at all.
    pub async fn transition_record(
        &self,
        scope: &TenantScope,
        record_id: Uuid,
        cmd: RecordTransition,
    ) -> AppResult<vehicle_record::Model> {
        for _attempt in 0..TRANSITION_MAX_ATTEMPTS {
            let record = scope
                .records()
                .filter(vehicle_record::Column::Id.eq(record_id))
                .one(self.connection())
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to fetch vehicle record: {}", e))
                })?
                .ok_or_else(|| AppError::NotFound(format!("Vehicle record {}", record_id)))?;

            let from = VehicleStatus::parse(&record.status).ok_or_else(|| {
                AppError::Database(format!(
                    "Record {} has unknown status '{}'",
                    record.id, record.status
                ))
            })?;

            let normal = from.can_transition_to(cmd.target);
            let overridden = !normal
                && cmd.allow_override
                && from.is_terminal()
                && cmd.target != from
                && cmd.target != VehicleStatus::Pending;

            if !normal && !overridden {
                return Err(AppError::InvalidTransition {
                    from: from.as_str().to_string(),
                    to: cmd.target.as_str().to_string(),
                });
            }

            let txn = self.connection().begin().await.map_err(|e| {
                AppError::Database(format!("Failed to open transition transaction: {}", e))
            })?;

            let updated = txn
                .execute_raw(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    r#"UPDATE vehicle_records
                       SET status = $1, yard_name = $2, yard_location = $3,
                           version = version + 1, updated_at = $4
                       WHERE id = $5 AND tenant_id = $6 AND version = $7"#,
                    [
                        cmd.target.as_str().into(),
                        cmd.yard_name.clone().into(),
                        cmd.yard_location.clone().into(),
                        Utc::now().into(),
                        sea_orm::Value::Uuid(Some(record.id.into())),
                        sea_orm::Value::Uuid(Some(scope.tenant_id().into())),
                        record.version.into(),
                    ],
                ))
                .await
                .map_err(|e| AppError::Database(format!("Failed to update status: {}", e)))?;

            if updated.rows_affected() == 0 {
                // Lost the version race; re-read and try again.
                txn.rollback().await.ok();
                continue;
            }

            status_event::ActiveModel {
                id: Set(Uuid::now_v7()),
                record_id: Set(record.id),
                tenant_id: Set(scope.tenant_id()),
                from_status: Set(from.as_str().to_string()),
                to_status: Set(cmd.target.as_str().to_string()),
                actor: Set(cmd.actor.clone()),
                via_override: Set(overridden),
                yard_name: Set(cmd.yard_name.clone()),
                yard_location: Set(cmd.yard_location.clone()),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to record status event: {}", e)))?;

            apply_status_delta(&txn, record.batch_id, from, cmd.target).await?;

            txn.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit transition: {}", e))
            })?;

            if overridden {
                warn!(
                    target: "audit",
                    "Terminal status override: record {} {} -> {} by {}",
                    record.id,
                    from.as_str(),
                    cmd.target.as_str(),
                    cmd.actor
                );
            }

            return self.get_record(scope, record_id).await;
        }

        Err(AppError::Conflict(format!(
            "Record {} was modified concurrently; transition not applied",
            record_id
        )))
    }

    /// Delete records whose batch row never landed.
    ///
    /// An ingestion that dies between the record chunks and the batch row
    /// leaves records behind with a dangling batch_id. They are invisible to
    /// batch listings and dashboards, and removed here once older than the
    /// grace window. Audit events cascade with their record.
    pub async fn sweep_orphan_records(&self, grace_secs: u64) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::seconds(grace_secs as i64);

        let result = self
            .connection()
            .execute_raw(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                r#"DELETE FROM vehicle_records r
                   WHERE NOT EXISTS (SELECT 1 FROM upload_batches b WHERE b.id = r.batch_id)
                     AND r.created_at < $1"#,
                [cutoff.into()],
            ))
            .await
            .map_err(|e| AppError::Database(format!("Failed to sweep orphan records: {}", e)))?;

        Ok(result.rows_affected())
    }
}
