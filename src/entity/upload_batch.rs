//! Upload batch entity for SeaORM.
//!
//! One row per ingested spreadsheet. The row is written after the vehicle
//! records it produced, carrying the final ingestion counters.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "upload_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub vehicle_class: String,
    pub file_name: String,
    /// Name of the API key that performed the upload
    pub uploaded_by: String,
    /// S3 key of the archived raw file
    pub source_key: Option<String>,
    /// Header resolution snapshot: source column -> canonical field or extra
    #[sea_orm(column_type = "JsonBinary")]
    pub header_map: JsonValue,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub duplicate_rows: i32,
    pub rejected_rows: i32,
    /// Live status counters, maintained by transitions and reconciliation
    pub pending_count: i32,
    pub hold_count: i32,
    pub in_yard_count: i32,
    pub released_count: i32,
    pub cancelled_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(has_many = "super::vehicle_record::Entity")]
    Records,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::vehicle_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
