//! Upload batch endpoints.

use actix_web::{HttpResponse, get, web};
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::entity::upload_batch;
use crate::error::{AppError, AppResult};
use crate::models::{
    BatchDetail, BatchListResponse, BatchSummary, Pagination, PaginationParams, StatusCounts,
    VehicleClass,
};

/// Configure batch routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_batches).service(get_batch);
}

fn stored_class(batch_id: Uuid, raw: &str) -> AppResult<VehicleClass> {
    VehicleClass::parse(raw).ok_or_else(|| {
        AppError::Database(format!(
            "Batch {} has unknown vehicle class '{}'",
            batch_id, raw
        ))
    })
}

fn to_summary(model: upload_batch::Model) -> AppResult<BatchSummary> {
    Ok(BatchSummary {
        id: model.id,
        vehicle_class: stored_class(model.id, &model.vehicle_class)?,
        file_name: model.file_name,
        uploaded_by: model.uploaded_by,
        total_rows: model.total_rows,
        inserted_rows: model.inserted_rows,
        duplicate_rows: model.duplicate_rows,
        rejected_rows: model.rejected_rows,
        created_at: model.created_at,
    })
}

/// List the tenant's upload batches, newest first.
///
/// GET /api/v1/batches
#[utoipa::path(
    get,
    path = "/api/v1/batches",
    tag = "Batches",
    params(
        ("page" = Option<u32>, Query, description = "Page number (default 1)"),
        ("limit" = Option<u32>, Query, description = "Results per page (default 100, max 100)")
    ),
    responses(
        (status = 200, description = "Paginated batch listing", body = BatchListResponse),
        (status = 403, description = "Tenant-bound key required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/batches")]
pub async fn list_batches(
    auth: ApiKeyAuth,
    query: web::Query<PaginationParams>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let (models, total) = pool.list_batches(&scope, &query).await?;

    let batches = models
        .into_iter()
        .map(to_summary)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(BatchListResponse {
        batches,
        pagination: Pagination::new(query.page(), query.clamped_limit(), total),
    }))
}

/// Get one batch with its live status counters.
///
/// GET /api/v1/batches/{id}
#[utoipa::path(
    get,
    path = "/api/v1/batches/{id}",
    tag = "Batches",
    params(
        ("id" = Uuid, Path, description = "Batch UUID")
    ),
    responses(
        (status = 200, description = "Batch detail", body = BatchDetail),
        (status = 403, description = "Tenant-bound key required"),
        (status = 404, description = "Batch not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/batches/{id}")]
pub async fn get_batch(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;
    let id = path.into_inner();

    let model = pool
        .get_batch(&scope, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))?;

    let detail = BatchDetail {
        id: model.id,
        vehicle_class: stored_class(model.id, &model.vehicle_class)?,
        file_name: model.file_name,
        uploaded_by: model.uploaded_by,
        source_key: model.source_key,
        header_map: model.header_map,
        total_rows: model.total_rows,
        inserted_rows: model.inserted_rows,
        duplicate_rows: model.duplicate_rows,
        rejected_rows: model.rejected_rows,
        status_counts: StatusCounts {
            pending: model.pending_count as i64,
            hold: model.hold_count as i64,
            in_yard: model.in_yard_count as i64,
            released: model.released_count as i64,
            cancelled: model.cancelled_count as i64,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    };

    Ok(HttpResponse::Ok().json(detail))
}
