//! Migration: Create clients table.
//!
//! Clients are the financiers a tenant repossesses for. Names double as
//! dashboard labels, unique per tenant.

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
                CREATE TABLE clients (
                    id UUID PRIMARY KEY,
                    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                    name VARCHAR(200) NOT NULL,
                    contact_phone VARCHAR(20),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    UNIQUE (tenant_id, name)
                );

                -- Index for per-tenant listings
                CREATE INDEX idx_clients_tenant_id ON clients(tenant_id);

                -- Trigger to update updated_at
                CREATE TRIGGER update_clients_updated_at
                    BEFORE UPDATE ON clients
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
                DROP TRIGGER IF EXISTS update_clients_updated_at ON clients;
                DROP TABLE IF EXISTS clients CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
