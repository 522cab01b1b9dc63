//! Migration: Create api_keys table.
//!
//! API keys for authentication with role-based access control. Manager and
//! agent keys are bound to a tenant; platform admin keys are not.

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
                CREATE TABLE api_keys (
                    id UUID PRIMARY KEY,
                    key_hash VARCHAR(64) NOT NULL,
                    key_prefix VARCHAR(12) NOT NULL,
                    name VARCHAR(100) NOT NULL,
                    role VARCHAR(20) NOT NULL DEFAULT 'agent'
                        CHECK (role IN ('admin', 'manager', 'agent')),
                    tenant_id UUID REFERENCES tenants(id) ON DELETE CASCADE,

                    expires_at TIMESTAMPTZ,
                    last_used_at TIMESTAMPTZ,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ,

                    -- Platform admin keys carry no tenant; tenant keys must
                    CHECK ((role = 'admin') = (tenant_id IS NULL))
                );

                -- Unique constraint on key_hash for active keys only
                CREATE UNIQUE INDEX idx_api_keys_key_hash_active
                    ON api_keys(key_hash)
                    WHERE deleted_at IS NULL;

                -- Index for prefix lookup (showing key prefix in listings)
                CREATE INDEX idx_api_keys_key_prefix ON api_keys(key_prefix);

                -- Index for per-tenant key listings
                CREATE INDEX idx_api_keys_tenant_id ON api_keys(tenant_id)
                    WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS api_keys CASCADE;")
            .await?;

        Ok(())
    }
}
