//! Tenant dashboard endpoint.

use actix_web::{HttpResponse, get, web};

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::dashboard;

/// Configure dashboard routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_dashboard);
}

/// Get the tenant's aggregate dashboard.
///
/// GET /api/v1/dashboard
///
/// Record counts are scaled by the tenant's display multiplier; batch
/// counts are not.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Aggregate statistics", body = crate::models::DashboardResponse),
        (status = 403, description = "Tenant-bound key required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/dashboard")]
pub async fn get_dashboard(auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let response = dashboard::build_dashboard(pool.get_ref(), &scope).await?;

    Ok(HttpResponse::Ok().json(response))
}
