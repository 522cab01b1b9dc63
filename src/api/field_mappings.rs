//! Per-tenant header alias configuration handlers.

use actix_web::{HttpResponse, get, put, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{AliasMap, FieldMappingResponse, UpdateFieldMappingRequest};
use crate::services::header_map::normalize_header;

/// Configure field mapping routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_field_mappings).service(put_field_mappings);
}

fn parse_stored_aliases(value: serde_json::Value) -> AppResult<AliasMap> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Stored field mapping is not readable: {}", e)))
}

/// Get the tenant's alias configuration.
///
/// GET /api/v1/field-mappings
///
/// Returns only the tenant's own overlay. The built-in alias table is
/// always active underneath it.
#[utoipa::path(
    get,
    path = "/api/v1/field-mappings",
    tag = "FieldMappings",
    responses(
        (status = 200, description = "Alias configuration", body = FieldMappingResponse),
        (status = 403, description = "Manager role required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/field-mappings")]
pub async fn get_field_mappings(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_manager() {
        return Err(AppError::Forbidden(
            "Manager role required for alias configuration".to_string(),
        ));
    }

    let scope = pool.caller_scope(&auth.caller).await?;

    let response = match pool.get_field_mapping(&scope).await? {
        Some(row) => FieldMappingResponse {
            aliases: parse_stored_aliases(row.aliases)?,
            updated_at: Some(row.updated_at),
        },
        None => FieldMappingResponse {
            aliases: AliasMap::new(),
            updated_at: None,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Replace the tenant's alias configuration.
///
/// PUT /api/v1/field-mappings
///
/// Full replacement; an empty map clears all customization. Unknown
/// canonical field keys are rejected at deserialization.
#[utoipa::path(
    put,
    path = "/api/v1/field-mappings",
    tag = "FieldMappings",
    request_body = UpdateFieldMappingRequest,
    responses(
        (status = 200, description = "Alias configuration replaced", body = FieldMappingResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager role required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[put("/field-mappings")]
pub async fn put_field_mappings(
    auth: ApiKeyAuth,
    body: web::Json<UpdateFieldMappingRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_manager() {
        return Err(AppError::Forbidden(
            "Manager role required for alias configuration".to_string(),
        ));
    }

    let scope = pool.caller_scope(&auth.caller).await?;
    let req = body.into_inner();

    // An alias that normalizes to nothing could never match a header
    for (field, aliases) in &req.aliases {
        for alias in aliases {
            if normalize_header(alias).is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Alias '{}' for {} contains no letters or digits",
                    alias, field
                )));
            }
        }
    }

    let stored = serde_json::to_value(&req.aliases)
        .map_err(|e| AppError::InvalidInput(format!("Alias map not serializable: {}", e)))?;

    let row = pool.upsert_field_mapping(&scope, stored).await?;

    Ok(HttpResponse::Ok().json(FieldMappingResponse {
        aliases: parse_stored_aliases(row.aliases)?,
        updated_at: Some(row.updated_at),
    }))
}
