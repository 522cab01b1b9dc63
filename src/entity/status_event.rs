//! Status event entity for SeaORM. Append-only transition audit trail.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "status_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub record_id: Uuid,
    pub tenant_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    /// Name of the API key that performed the transition
    pub actor: String,
    /// True when a terminal state was left through a manager override
    pub via_override: bool,
    pub yard_name: Option<String>,
    pub yard_location: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_record::Entity",
        from = "Column::RecordId",
        to = "super::vehicle_record::Column::Id",
        on_delete = "Cascade"
    )]
    Record,
}

impl Related<super::vehicle_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
