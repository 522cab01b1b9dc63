//! Migration: Create field_mappings table.
//!
//! One JSONB alias overlay per tenant, merged over the built-in header
//! alias table during ingestion.

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
                CREATE TABLE field_mappings (
                    id UUID PRIMARY KEY,
                    tenant_id UUID NOT NULL UNIQUE REFERENCES tenants(id) ON DELETE CASCADE,

                    -- {canonical_field: ["Header Alias", ...]}
                    aliases JSONB NOT NULL DEFAULT '{}'::jsonb,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Trigger to update updated_at
                CREATE TRIGGER update_field_mappings_updated_at
                    BEFORE UPDATE ON field_mappings
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
                DROP TRIGGER IF EXISTS update_field_mappings_updated_at ON field_mappings;
                DROP TABLE IF EXISTS field_mappings CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
