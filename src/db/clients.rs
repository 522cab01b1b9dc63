//! Database queries for a tenant's client registry.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::client::{self, ActiveModel, Entity as Client};
use crate::error::{AppError, AppResult};

use super::DbPool;
use super::partition::TenantScope;

impl DbPool {
    /// Insert a new client under the tenant. Names are unique per tenant.
    pub async fn insert_client(
        &self,
        scope: &TenantScope,
        name: &str,
        contact_phone: Option<String>,
    ) -> AppResult<client::Model> {
        let existing = Client::find()
            .filter(client::Column::TenantId.eq(scope.tenant_id()))
            .filter(client::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check client name: {}", e)))?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Client '{}' already exists",
                name
            )));
        }

        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(scope.tenant_id()),
            name: Set(name.to_string()),
            contact_phone: Set(contact_phone),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert client: {}", e)))?;

        Ok(result)
    }

    /// List the tenant's clients alphabetically.
    pub async fn list_clients(&self, scope: &TenantScope) -> AppResult<Vec<client::Model>> {
        let results = Client::find()
            .filter(client::Column::TenantId.eq(scope.tenant_id()))
            .order_by_asc(client::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list clients: {}", e)))?;

        Ok(results)
    }

    /// Delete a client by id within the tenant.
    pub async fn delete_client(&self, scope: &TenantScope, id: Uuid) -> AppResult<()> {
        let result = Client::delete_many()
            .filter(client::Column::TenantId.eq(scope.tenant_id()))
            .filter(client::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete client: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Client {}", id)));
        }

        Ok(())
    }
}
