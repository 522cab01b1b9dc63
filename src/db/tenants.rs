//! Database queries for tenants.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::tenant::{self, ActiveModel, Entity as Tenant};
use crate::error::{AppError, AppResult};
use crate::models::OrgType;

use super::DbPool;

impl DbPool {
    /// Insert a new tenant.
    pub async fn insert_tenant(
        &self,
        id: Uuid,
        name: &str,
        display_name: &str,
        org_type: OrgType,
        data_multiplier: i32,
    ) -> AppResult<tenant::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            org_type: Set(org_type.as_str().to_string()),
            data_multiplier: Set(data_multiplier),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert tenant: {}", e)))?;

        Ok(result)
    }

    /// Get a tenant by ID.
    pub async fn get_tenant_by_id(&self, id: Uuid) -> AppResult<Option<tenant::Model>> {
        let result = Tenant::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get tenant: {}", e)))?;

        Ok(result)
    }

    /// Get a tenant by its unique short name.
    pub async fn get_tenant_by_name(&self, name: &str) -> AppResult<Option<tenant::Model>> {
        let result = Tenant::find()
            .filter(tenant::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get tenant by name: {}", e)))?;

        Ok(result)
    }

    /// List all tenants, newest first. Includes deactivated ones.
    pub async fn list_tenants(&self) -> AppResult<Vec<tenant::Model>> {
        let results = Tenant::find()
            .order_by_desc(tenant::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list tenants: {}", e)))?;

        Ok(results)
    }

    /// Apply a partial update to a tenant. Passing all None is a no-op fetch.
    pub async fn update_tenant(
        &self,
        id: Uuid,
        display_name: Option<String>,
        data_multiplier: Option<i32>,
        is_active: Option<bool>,
    ) -> AppResult<tenant::Model> {
        let tenant = self
            .get_tenant_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {}", id)))?;

        let mut active: ActiveModel = tenant.into();
        if let Some(display_name) = display_name {
            active.display_name = Set(display_name);
        }
        if let Some(data_multiplier) = data_multiplier {
            active.data_multiplier = Set(data_multiplier);
        }
        if let Some(is_active) = is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update tenant: {}", e)))?;

        Ok(result)
    }
}
