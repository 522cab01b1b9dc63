//! Tenant partition handles.
//!
//! `TenantScope` and `Partition` are the only path from caller identity to
//! storage scope. Their fields are private and the only constructors live on
//! `DbPool`, which verifies the tenant row first; every vehicle and batch
//! query in this crate goes through the scoped selects built here, so no
//! query can touch another tenant's rows by accident.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select, TransactionTrait};
use tracing::{error, info};
use uuid::Uuid;

use crate::entity::status_event::{self, Entity as StatusEvent};
use crate::entity::tenant::{self, Entity as Tenant};
use crate::entity::upload_batch::{self, Entity as UploadBatch};
use crate::entity::vehicle_record::{self, Entity as VehicleRecord};
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedCaller, VEHICLE_CLASSES, VehicleClass};

use super::DbPool;

/// Proof that a tenant exists (and, on the caller path, is active).
///
/// Obtained from [`DbPool::tenant_scope`] or [`DbPool::caller_scope`]; cannot
/// be constructed elsewhere.
#[derive(Debug, Clone)]
pub struct TenantScope {
    tenant_id: Uuid,
    data_multiplier: i32,
}

impl TenantScope {
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    /// Display multiplier for dashboard aggregates.
    pub fn data_multiplier(&self) -> i64 {
        self.data_multiplier as i64
    }

    /// Narrow the scope to one vehicle class.
    pub fn partition(&self, class: VehicleClass) -> Partition {
        Partition {
            tenant_id: self.tenant_id,
            class,
        }
    }

    /// All three partitions in canonical class order.
    pub fn partitions(&self) -> [Partition; 3] {
        VEHICLE_CLASSES.map(|class| self.partition(class))
    }

    /// Vehicle records across all of the tenant's partitions.
    pub(crate) fn records(&self) -> Select<VehicleRecord> {
        VehicleRecord::find().filter(vehicle_record::Column::TenantId.eq(self.tenant_id))
    }

    /// Upload batches across all of the tenant's partitions.
    pub(crate) fn batches(&self) -> Select<UploadBatch> {
        UploadBatch::find().filter(upload_batch::Column::TenantId.eq(self.tenant_id))
    }
}

/// One (tenant, vehicle class) slice of the data.
#[derive(Debug, Clone, Copy)]
pub struct Partition {
    tenant_id: Uuid,
    class: VehicleClass,
}

impl Partition {
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// Vehicle records in this partition.
    pub(crate) fn records(&self) -> Select<VehicleRecord> {
        VehicleRecord::find()
            .filter(vehicle_record::Column::TenantId.eq(self.tenant_id))
            .filter(vehicle_record::Column::VehicleClass.eq(self.class.as_str()))
    }
}

/// What a tenant purge removed.
#[derive(Debug, Clone, Copy)]
pub struct PurgeSummary {
    pub vehicle_records: u64,
    pub status_events: u64,
    pub upload_batches: u64,
}

impl DbPool {
    /// Resolve a tenant into a scope handle.
    ///
    /// Fails with `PartitionResolution` for unknown or deactivated tenants; every
    /// refusal is security-logged because the id came from a caller's key.
    pub async fn tenant_scope(&self, tenant_id: Uuid) -> AppResult<TenantScope> {
        let row = Tenant::find_by_id(tenant_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to resolve tenant: {}", e)))?;

        match row {
            Some(t) if t.is_active => Ok(TenantScope {
                tenant_id: t.id,
                data_multiplier: t.data_multiplier,
            }),
            Some(_) => {
                error!(target: "security", tenant_id = %tenant_id, "Scope refused: tenant deactivated");
                Err(AppError::PartitionResolution(format!(
                    "tenant {} is deactivated",
                    tenant_id
                )))
            }
            None => {
                error!(target: "security", tenant_id = %tenant_id, "Scope refused: unknown tenant");
                Err(AppError::PartitionResolution(format!(
                    "unknown tenant {}",
                    tenant_id
                )))
            }
        }
    }

    /// Resolve the caller's tenant into a scope handle.
    ///
    /// Platform admin keys carry no tenant and are rejected: tenant data is
    /// only reachable through a tenant-bound key.
    pub async fn caller_scope(&self, caller: &AuthenticatedCaller) -> AppResult<TenantScope> {
        let tenant_id = caller.tenant_id.ok_or_else(|| {
            AppError::Forbidden("Platform keys cannot access tenant data".to_string())
        })?;

        self.tenant_scope(tenant_id).await
    }

    /// Resolve a tenant for administrative maintenance, active or not.
    ///
    /// Used by the purge path so a deactivated tenant can still be cleaned
    /// out. Unknown tenants are a plain 404 here, not a security event.
    pub async fn admin_scope(&self, tenant_id: Uuid) -> AppResult<TenantScope> {
        let row = Tenant::find_by_id(tenant_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to resolve tenant: {}", e)))?;

        match row {
            Some(t) => Ok(TenantScope {
                tenant_id: t.id,
                data_multiplier: t.data_multiplier,
            }),
            None => Err(AppError::NotFound(format!("Tenant {}", tenant_id))),
        }
    }

    /// Remove every data row the tenant owns and deactivate it.
    ///
    /// Status events, vehicle records and upload batches go; clients, field
    /// mappings and API keys stay. One transaction, so a failed purge leaves
    /// the tenant untouched.
    pub async fn purge_tenant_data(&self, scope: &TenantScope) -> AppResult<PurgeSummary> {
        let tenant_id = scope.tenant_id();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open purge transaction: {}", e)))?;

        let events = StatusEvent::delete_many()
            .filter(status_event::Column::TenantId.eq(tenant_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to purge status events: {}", e)))?;

        let records = VehicleRecord::delete_many()
            .filter(vehicle_record::Column::TenantId.eq(tenant_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to purge vehicle records: {}", e)))?;

        let batches = UploadBatch::delete_many()
            .filter(upload_batch::Column::TenantId.eq(tenant_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to purge upload batches: {}", e)))?;

        Tenant::update_many()
            .col_expr(tenant::Column::IsActive, Expr::value(false))
            .filter(tenant::Column::Id.eq(tenant_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to deactivate tenant: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit purge: {}", e)))?;

        let summary = PurgeSummary {
            vehicle_records: records.rows_affected,
            status_events: events.rows_affected,
            upload_batches: batches.rows_affected,
        };

        info!(
            tenant_id = %tenant_id,
            vehicle_records = summary.vehicle_records,
            status_events = summary.status_events,
            upload_batches = summary.upload_batches,
            "Tenant data purged"
        );

        Ok(summary)
    }
}
