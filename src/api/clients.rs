//! Client registry handlers.
//!
//! Clients are the financiers a tenant recovers vehicles for. The registry
//! is reference data only; vehicle rows keep the free-form bank name that
//! arrived in the sheet.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ClientResponse, CreateClientRequest};

/// Configure client registry routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_clients)
        .service(create_client)
        .service(delete_client);
}

/// List the tenant's clients alphabetically.
///
/// GET /api/v1/clients
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "List of clients", body = ClientListResponse),
        (status = 403, description = "Tenant-bound key required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/clients")]
pub async fn list_clients(auth: ApiKeyAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let scope = pool.caller_scope(&auth.caller).await?;

    let clients = pool
        .list_clients(&scope)
        .await?
        .into_iter()
        .map(|c| ClientResponse {
            id: c.id,
            name: c.name,
            contact_phone: c.contact_phone,
            created_at: c.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ClientListResponse { clients }))
}

/// Register a client under the tenant.
///
/// POST /api/v1/clients
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client registered", body = ClientResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Manager role required"),
        (status = 409, description = "Name already registered", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[post("/clients")]
pub async fn create_client(
    auth: ApiKeyAuth,
    body: web::Json<CreateClientRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_manager() {
        return Err(AppError::Forbidden(
            "Manager role required to register clients".to_string(),
        ));
    }

    let scope = pool.caller_scope(&auth.caller).await?;
    let req = body.into_inner();

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }

    let contact_phone = req
        .contact_phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let client = pool.insert_client(&scope, name, contact_phone).await?;

    Ok(HttpResponse::Created().json(ClientResponse {
        id: client.id,
        name: client.name,
        contact_phone: client.contact_phone,
        created_at: client.created_at,
    }))
}

/// Remove a client from the registry.
///
/// DELETE /api/v1/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    params(
        ("id" = Uuid, Path, description = "Client UUID")
    ),
    responses(
        (status = 200, description = "Client removed", body = DeleteClientResponse),
        (status = 403, description = "Manager role required"),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
#[delete("/clients/{id}")]
pub async fn delete_client(
    auth: ApiKeyAuth,
    path: web::Path<Uuid>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_manager() {
        return Err(AppError::Forbidden(
            "Manager role required to remove clients".to_string(),
        ));
    }

    let scope = pool.caller_scope(&auth.caller).await?;
    let id = path.into_inner();

    pool.delete_client(&scope, id).await?;

    Ok(HttpResponse::Ok().json(DeleteClientResponse {
        message: "Client removed".to_string(),
        id,
    }))
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientListResponse {
    clients: Vec<ClientResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteClientResponse {
    message: String,
    id: Uuid,
}
