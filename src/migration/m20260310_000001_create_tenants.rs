//! Migration: Create tenants table and shared trigger function.
//!
//! Tenants are the isolation root: every data row in the system hangs off
//! one. Also creates the shared updated_at trigger function.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                -- Tenants table
                CREATE TABLE tenants (
                    id UUID PRIMARY KEY,
                    name VARCHAR(64) NOT NULL UNIQUE,
                    display_name VARCHAR(200) NOT NULL,
                    org_type VARCHAR(20) NOT NULL
                        CHECK (org_type IN ('agency', 'bank', 'nbfc')),
                    data_multiplier INTEGER NOT NULL DEFAULT 1
                        CHECK (data_multiplier >= 1),
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for partition resolution (active tenants only)
                CREATE INDEX idx_tenants_is_active ON tenants(id)
                    WHERE is_active;

                -- Trigger to update updated_at
                CREATE TRIGGER update_tenants_updated_at
                    BEFORE UPDATE ON tenants
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
                DROP TRIGGER IF EXISTS update_tenants_updated_at ON tenants;
                DROP TABLE IF EXISTS tenants CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
