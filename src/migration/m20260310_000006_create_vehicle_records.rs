//! Migration: Create vehicle_records table.
//!
//! The main data table. Every query against it carries (tenant_id,
//! vehicle_class); batch_id deliberately has no foreign key because records
//! are inserted before their batch row exists.

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
                CREATE TABLE vehicle_records (
                    id UUID PRIMARY KEY,
                    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                    vehicle_class VARCHAR(20) NOT NULL
                        CHECK (vehicle_class IN ('two_wheeler', 'four_wheeler', 'commercial')),
                    batch_id UUID NOT NULL,

                    registration_no VARCHAR(20) NOT NULL,
                    chassis_no VARCHAR(50),
                    engine_no VARCHAR(50),
                    loan_no VARCHAR(50),
                    customer_name VARCHAR(200),
                    bank_name VARCHAR(200),
                    make_model VARCHAR(200),
                    branch VARCHAR(200),
                    emi_amount NUMERIC(14, 2),
                    address TEXT,

                    -- Unmapped source columns, verbatim
                    extra JSONB,

                    status VARCHAR(20) NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'hold', 'in_yard', 'released', 'cancelled')),
                    yard_name VARCHAR(200),
                    yard_location VARCHAR(200),
                    version INTEGER NOT NULL DEFAULT 1,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Every data-path query starts from (tenant_id, vehicle_class)
                CREATE INDEX idx_vehicle_records_tenant_class
                    ON vehicle_records(tenant_id, vehicle_class);

                -- Exact registration lookup within a partition
                CREATE INDEX idx_vehicle_records_registration
                    ON vehicle_records(tenant_id, vehicle_class, registration_no);

                -- Pattern index for registration scans
                CREATE INDEX idx_vehicle_records_registration_pattern
                    ON vehicle_records(registration_no varchar_pattern_ops);

                -- Orphan sweeps and batch recounts walk batch_id
                CREATE INDEX idx_vehicle_records_batch_id ON vehicle_records(batch_id);

                -- GIN index for JSONB queries over retained extra columns
                CREATE INDEX idx_vehicle_records_extra ON vehicle_records USING GIN (extra);

                -- Trigger to update updated_at
                CREATE TRIGGER update_vehicle_records_updated_at
                    BEFORE UPDATE ON vehicle_records
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
                DROP TRIGGER IF EXISTS update_vehicle_records_updated_at ON vehicle_records;
                DROP TABLE IF EXISTS vehicle_records CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
