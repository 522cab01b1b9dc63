//! Vehicle record entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicle_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub vehicle_class: String,
    /// Batch that produced this record; unconstrained because records land
    /// before their batch row
    pub batch_id: Uuid,
    /// Normalized: uppercase, alphanumeric only
    pub registration_no: String,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
    pub loan_no: Option<String>,
    pub customer_name: Option<String>,
    pub bank_name: Option<String>,
    pub make_model: Option<String>,
    pub branch: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub emi_amount: Option<Decimal>,
    pub address: Option<String>,
    /// Unmapped source columns, verbatim (original header -> cell value)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub extra: Option<JsonValue>,
    /// pending, hold, in_yard, released or cancelled
    pub status: String,
    pub yard_name: Option<String>,
    pub yard_location: Option<String>,
    /// Optimistic concurrency counter, bumped by every transition
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::upload_batch::Entity",
        from = "Column::BatchId",
        to = "super::upload_batch::Column::Id"
    )]
    Batch,
    #[sea_orm(has_many = "super::status_event::Entity")]
    StatusEvents,
}

impl Related<super::upload_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl Related<super::status_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
