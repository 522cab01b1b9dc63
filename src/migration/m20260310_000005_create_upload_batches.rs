//! Migration: Create upload_batches table.
//!
//! One row per ingested spreadsheet, written after its vehicle records with
//! the final ingestion counters. The batch row existing is what makes an
//! ingestion visible.

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
                CREATE TABLE upload_batches (
                    id UUID PRIMARY KEY,
                    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                    vehicle_class VARCHAR(20) NOT NULL
                        CHECK (vehicle_class IN ('two_wheeler', 'four_wheeler', 'commercial')),
                    file_name VARCHAR(255) NOT NULL,
                    uploaded_by VARCHAR(100) NOT NULL,
                    source_key VARCHAR(512),

                    -- Header resolution snapshot as JSONB
                    -- [{"header": "Reg No", "target": "registration_no"}, ...]
                    header_map JSONB NOT NULL,

                    total_rows INTEGER NOT NULL DEFAULT 0,
                    inserted_rows INTEGER NOT NULL DEFAULT 0,
                    duplicate_rows INTEGER NOT NULL DEFAULT 0,
                    rejected_rows INTEGER NOT NULL DEFAULT 0,

                    -- Live status counters over the batch's surviving records
                    pending_count INTEGER NOT NULL DEFAULT 0,
                    hold_count INTEGER NOT NULL DEFAULT 0,
                    in_yard_count INTEGER NOT NULL DEFAULT 0,
                    released_count INTEGER NOT NULL DEFAULT 0,
                    cancelled_count INTEGER NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for partition-scoped listings and dashboard rollups
                CREATE INDEX idx_upload_batches_tenant_class
                    ON upload_batches(tenant_id, vehicle_class);

                -- Index for listing by upload date
                CREATE INDEX idx_upload_batches_created_at
                    ON upload_batches(created_at DESC);

                -- Trigger to update updated_at
                CREATE TRIGGER update_upload_batches_updated_at
                    BEFORE UPDATE ON upload_batches
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_upload_batches_updated_at ON upload_batches;
                DROP TABLE IF EXISTS upload_batches CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
