//! Database queries for per-tenant header alias configuration.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::field_mapping::{self, ActiveModel, Entity as FieldMapping};
use crate::error::{AppError, AppResult};

use super::DbPool;
use super::partition::TenantScope;

impl DbPool {
    /// Get the tenant's alias overlay, if it ever customized one.
    pub async fn get_field_mapping(
        &self,
        scope: &TenantScope,
    ) -> AppResult<Option<field_mapping::Model>> {
        let result = FieldMapping::find()
            .filter(field_mapping::Column::TenantId.eq(scope.tenant_id()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get field mapping: {}", e)))?;

        Ok(result)
    }

    /// Replace the tenant's alias overlay, creating the row on first write.
    pub async fn upsert_field_mapping(
        &self,
        scope: &TenantScope,
        aliases: JsonValue,
    ) -> AppResult<field_mapping::Model> {
        let now = Utc::now();

        let result = match self.get_field_mapping(scope).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.aliases = Set(aliases);
                active.updated_at = Set(now);
                active
                    .update(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to update field mapping: {}", e)))?
            }
            None => {
                let model = ActiveModel {
                    id: Set(Uuid::now_v7()),
                    tenant_id: Set(scope.tenant_id()),
                    aliases: Set(aliases),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                model
                    .insert(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to insert field mapping: {}", e)))?
            }
        };

        Ok(result)
    }
}
