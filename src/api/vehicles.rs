//! Vehicle endpoints: sheet ingestion, search, detail, status transitions.

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use tokio::sync::Semaphore;
use tracing::warn;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{SearchParams, TransitionRequest, VehicleClass};
use crate::services::{Storage, ingest, search, status};

/// Configure vehicle routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // /vehicles/search must register before /vehicles/{id}
    cfg.service(upload_sheet)
        .service(search_vehicles)
        .service(get_vehicle)
        .service(transition_vehicle);
}

/// Ingest a spreadsheet into one vehicle class partition.
///
/// POST /api/v1/vehicles/{class}/upload
/// Content-Type: multipart/form-data, field name "file"
#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{class}/upload",
    tag = "Vehicles",
    params(
        ("class" = String, Path, description = "Vehicle class: two_wheeler, four_wheeler or commercial")
    ),
    responses(
        (status = 201, description = "Sheet ingested", body = crate::models::IngestResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager role required"),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 415, description = "Unsupported format", body = crate::error::ErrorResponse),
        (status = 422, description = "Required column missing", body = crate::error::ErrorResponse),
        (status = 503, description = "Too many concurrent uploads", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/vehicles/{class}/upload")]
pub async fn upload_sheet(
    auth: ApiKeyAuth,
    path: web::Path<String>,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    config: web::Data<Config>,
    upload_semaphore: web::Data<Arc<Semaphore>>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_manager() {
        return Err(AppError::Forbidden(
            "Manager role required to upload sheets".to_string(),
        ));
    }

    let raw_class = path.into_inner();
    let class = VehicleClass::parse(&raw_class)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown vehicle class '{}'", raw_class)))?;

    // Acquire upload permit (limits concurrent uploads to bound memory usage)
    let _permit = upload_semaphore.try_acquire().map_err(|_| {
        warn!(
            "Upload rejected for class {}: too many concurrent uploads",
            class.as_str()
        );
        AppError::ServiceUnavailable(
            "Too many concurrent uploads. Please try again later.".to_string(),
        )
    })?;

    let scope = pool.caller_scope(&auth.caller).await?;

    let (file_name, bytes) =
        ingest::read_spreadsheet_field(&mut payload, config.upload.max_file_size).await?;

    let response = ingest::ingest_spreadsheet(
        pool.get_ref(),
        storage.get_ref(),
        &scope,
        class,
        &auth.caller.name,
        &file_name,
        bytes,
        config.upload.insert_chunk_size,
    )
    .await?;

    Ok(HttpResponse::Created().json(response))
}

/// Search the tenant's vehicles by registration number.
///
/// GET /api/v1/vehicles/search?q=
///
/// Four digits search by registration suffix; a full plate searches exact.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/search",
    tag = "Vehicles",
    params(
        ("q" = String, Query, description = "Last four digits or a full registration number")
    ),
    responses(
        (status = 200, description = "Matching vehicles", body = crate::models::SearchResponse),
        (status = 400, description = "Unclassifiable query", body = crate::error::ErrorResponse),
        (status = 403, description = "Tenant-bound key required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/vehicles/search")]
pub async fn search_vehicles(
    auth: ApiKeyAuth,
    query: web::Query<SearchParams>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let response = search::run_search(
        pool.get_ref(),
        &scope,
        &query.q,
        config.search.max_results_per_class,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Get one vehicle record with its status history.
///
/// GET /api/v1/vehicles/{id}
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(
        ("id" = Uuid, Path, description = "Vehicle record UUID")
    ),
    responses(
        (status = 200, description = "Record detail with history", body = crate::models::VehicleDetail),
        (status = 403, description = "Tenant-bound key required"),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/vehicles/{id}")]
pub async fn get_vehicle(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let detail = search::fetch_detail(pool.get_ref(), &scope, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

/// Transition a vehicle record to a new status.
///
/// POST /api/v1/vehicles/{id}/status
///
/// Yard fields are accepted only when moving to `in_yard`. Leaving a
/// terminal state requires `"override": true` and the manager role.
#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{id}/status",
    tag = "Vehicles",
    params(
        ("id" = Uuid, Path, description = "Vehicle record UUID")
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Record transitioned", body = crate::models::VehicleDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Override requires manager role"),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Transition not allowed or concurrent update", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/vehicles/{id}/status")]
pub async fn transition_vehicle(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    body: web::Json<TransitionRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let detail = status::apply_transition(
        pool.get_ref(),
        &scope,
        &auth.caller,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(detail))
}
