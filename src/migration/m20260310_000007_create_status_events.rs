//! Migration: Create status_events table.
//!
//! Append-only audit trail of status transitions. Rows are never updated
//! or individually deleted; they go away with their record.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE status_events (
                    id UUID PRIMARY KEY,
                    record_id UUID NOT NULL REFERENCES vehicle_records(id) ON DELETE CASCADE,
                    tenant_id UUID NOT NULL,
                    from_status VARCHAR(20) NOT NULL,
                    to_status VARCHAR(20) NOT NULL,
                    actor VARCHAR(100) NOT NULL,
                    via_override BOOLEAN NOT NULL DEFAULT FALSE,
                    yard_name VARCHAR(200),
                    yard_location VARCHAR(200),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- History reads walk record_id in insertion order
                CREATE INDEX idx_status_events_record_id
                    ON status_events(record_id, created_at);

                -- Tenant purge walks tenant_id
                CREATE INDEX idx_status_events_tenant_id ON status_events(tenant_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS status_events CASCADE;")
            .await?;

        Ok(())
    }
}
