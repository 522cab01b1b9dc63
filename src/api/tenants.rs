//! Tenant administration handlers (platform admin only).

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::entity::tenant;
use crate::error::{AppError, AppResult};
use crate::models::{CreateTenantRequest, OrgType, TenantResponse, UpdateTenantRequest};

/// Configure tenant admin routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_tenant)
        .service(list_tenants)
        .service(update_tenant)
        .service(purge_tenant);
}

/// Tenant short names are lowercase slugs: a-z, 0-9 and hyphens, 3-64
/// chars, no leading or trailing hyphen.
fn valid_slug(name: &str) -> bool {
    (3..=64).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

fn to_response(t: tenant::Model) -> AppResult<TenantResponse> {
    let org_type = OrgType::parse(&t.org_type).ok_or_else(|| {
        AppError::Database(format!(
            "Tenant {} has unknown org type '{}'",
            t.id, t.org_type
        ))
    })?;

    Ok(TenantResponse {
        id: t.id,
        name: t.name,
        display_name: t.display_name,
        org_type,
        data_multiplier: t.data_multiplier,
        is_active: t.is_active,
        created_at: t.created_at,
        updated_at: t.updated_at,
    })
}

/// Create a new tenant.
///
/// POST /api/v1/tenants
#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    tag = "Tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = TenantResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Name already taken", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/tenants")]
pub async fn create_tenant(
    auth: ApiKeyAuth,
    body: web::Json<CreateTenantRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_admin() {
        return Err(AppError::Forbidden(
            "Admin role required to manage tenants".to_string(),
        ));
    }

    let req = body.into_inner();

    if !valid_slug(&req.name) {
        return Err(AppError::InvalidInput(
            "name must be a lowercase slug (a-z, 0-9, hyphens), 3-64 characters".to_string(),
        ));
    }
    if req.display_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "display_name is required".to_string(),
        ));
    }

    let data_multiplier = req.data_multiplier.unwrap_or(1);
    if data_multiplier < 1 {
        return Err(AppError::InvalidInput(
            "data_multiplier must be at least 1".to_string(),
        ));
    }

    if pool.get_tenant_by_name(&req.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Tenant '{}' already exists",
            req.name
        )));
    }

    let tenant = pool
        .insert_tenant(
            Uuid::now_v7(),
            &req.name,
            req.display_name.trim(),
            req.org_type,
            data_multiplier,
        )
        .await?;

    info!(
        "Tenant created: id={}, name={}, org_type={}, multiplier={}",
        tenant.id, tenant.name, tenant.org_type, tenant.data_multiplier
    );

    Ok(HttpResponse::Created().json(to_response(tenant)?))
}

/// List all tenants.
///
/// GET /api/v1/tenants
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    tag = "Tenants",
    responses(
        (status = 200, description = "List of tenants", body = TenantListResponse),
        (status = 403, description = "Admin role required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/tenants")]
pub async fn list_tenants(auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    if !auth.caller.is_admin() {
        return Err(AppError::Forbidden(
            "Admin role required to manage tenants".to_string(),
        ));
    }

    let tenants = pool
        .list_tenants()
        .await?
        .into_iter()
        .map(to_response)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(TenantListResponse { tenants }))
}

/// Update a tenant's display name, multiplier, or active flag.
///
/// PATCH /api/v1/tenants/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/tenants/{id}",
    tag = "Tenants",
    params(
        ("id" = Uuid, Path, description = "Tenant UUID")
    ),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated", body = TenantResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Tenant not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[patch("/tenants/{id}")]
pub async fn update_tenant(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTenantRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_admin() {
        return Err(AppError::Forbidden(
            "Admin role required to manage tenants".to_string(),
        ));
    }

    let id = path.into_inner();
    let req = body.into_inner();

    if let Some(multiplier) = req.data_multiplier
        && multiplier < 1
    {
        return Err(AppError::InvalidInput(
            "data_multiplier must be at least 1".to_string(),
        ));
    }
    if let Some(ref display_name) = req.display_name
        && display_name.trim().is_empty()
    {
        return Err(AppError::InvalidInput(
            "display_name cannot be blank".to_string(),
        ));
    }

    let tenant = pool
        .update_tenant(
            id,
            req.display_name.map(|n| n.trim().to_string()),
            req.data_multiplier,
            req.is_active,
        )
        .await?;

    info!(
        "Tenant updated: id={}, multiplier={}, active={}",
        tenant.id, tenant.data_multiplier, tenant.is_active
    );

    Ok(HttpResponse::Ok().json(to_response(tenant)?))
}

/// Purge all data rows a tenant owns and deactivate it.
///
/// DELETE /api/v1/tenants/{id}/data
///
/// Removes the tenant's vehicle records, status events and upload batches
/// in one transaction. Clients, field mappings and API keys survive so a
/// reactivated tenant keeps its configuration.
#[utoipa::path(
    delete,
    path = "/api/v1/tenants/{id}/data",
    tag = "Tenants",
    params(
        ("id" = Uuid, Path, description = "Tenant UUID")
    ),
    responses(
        (status = 200, description = "Tenant data purged", body = TenantPurgeResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Tenant not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[delete("/tenants/{id}/data")]
pub async fn purge_tenant(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_admin() {
        return Err(AppError::Forbidden(
            "Admin role required to manage tenants".to_string(),
        ));
    }

    let id = path.into_inner();

    // Resolves deactivated tenants too; purging twice is harmless
    let scope = pool.admin_scope(id).await?;
    let summary = pool.purge_tenant_data(&scope).await?;

    Ok(HttpResponse::Ok().json(TenantPurgeResponse {
        tenant_id: id,
        vehicle_records: summary.vehicle_records,
        status_events: summary.status_events,
        upload_batches: summary.upload_batches,
    }))
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantListResponse {
    tenants: Vec<TenantResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantPurgeResponse {
    tenant_id: Uuid,
    vehicle_records: u64,
    status_events: u64,
    upload_batches: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slug() {
        assert!(valid_slug("speedy-recoveries"));
        assert!(valid_slug("abc"));
        assert!(valid_slug("tenant-42"));

        assert!(!valid_slug("ab")); // too short
        assert!(!valid_slug("Speedy")); // uppercase
        assert!(!valid_slug("has space"));
        assert!(!valid_slug("-leading"));
        assert!(!valid_slug("trailing-"));
        assert!(!valid_slug(&"x".repeat(65)));
    }
}
