//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260310_000001_create_tenants;
mod m20260310_000002_create_api_keys;
mod m20260310_000003_create_clients;
mod m20260310_000004_create_field_mappings;
mod m20260310_000005_create_upload_batches;
mod m20260310_000006_create_vehicle_records;
mod m20260310_000007_create_status_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260310_000001_create_tenants::Migration),
            Box::new(m20260310_000002_create_api_keys::Migration),
            Box::new(m20260310_000003_create_clients::Migration),
            Box::new(m20260310_000004_create_field_mappings::Migration),
            Box::new(m20260310_000005_create_upload_batches::Migration),
            Box::new(m20260310_000006_create_vehicle_records::Migration),
            Box::new(m20260310_000007_create_status_events::Migration),
        ]
    }
}
