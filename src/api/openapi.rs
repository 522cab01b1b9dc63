//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RepoTrack Server",
        version = "0.1.0",
        description = "Multi-tenant vehicle repossession tracker: spreadsheet ingestion, registration search and status workflow"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Tenant endpoints
        api::tenants::create_tenant,
        api::tenants::list_tenants,
        api::tenants::update_tenant,
        api::tenants::purge_tenant,
        // Vehicle endpoints
        api::vehicles::upload_sheet,
        api::vehicles::search_vehicles,
        api::vehicles::get_vehicle,
        api::vehicles::transition_vehicle,
        // Batch endpoints
        api::batches::list_batches,
        api::batches::get_batch,
        // Dashboard
        api::dashboard::get_dashboard,
        // Template download
        api::templates::download_template,
        // Client endpoints
        api::clients::list_clients,
        api::clients::create_client,
        api::clients::delete_client,
        // Field mapping endpoints
        api::field_mappings::get_field_mappings,
        api::field_mappings::put_field_mappings,
        // Auth endpoints
        services::auth_admin::create_api_key,
        services::auth_admin::list_api_keys,
        services::auth_admin::revoke_api_key,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Tenants
            models::OrgType,
            models::CreateTenantRequest,
            models::UpdateTenantRequest,
            models::TenantResponse,
            api::tenants::TenantListResponse,
            api::tenants::TenantPurgeResponse,
            // Vehicles
            models::VehicleClass,
            models::VehicleStatus,
            models::VehicleSummary,
            models::VehicleDetail,
            models::StatusEventResponse,
            models::TransitionRequest,
            models::SearchMode,
            models::SearchParams,
            models::SearchResponse,
            // Ingestion
            models::IngestResponse,
            models::RowError,
            models::IngestWarning,
            models::DuplicateRowWarning,
            // Batches
            models::StatusCounts,
            models::BatchSummary,
            models::BatchDetail,
            models::BatchListResponse,
            models::Pagination,
            models::PaginationParams,
            // Dashboard
            models::ClassStats,
            models::DashboardResponse,
            // Clients
            models::CreateClientRequest,
            models::ClientResponse,
            api::clients::ClientListResponse,
            api::clients::DeleteClientResponse,
            // Field mappings
            models::CanonicalField,
            models::FieldMappingResponse,
            models::UpdateFieldMappingRequest,
            // Auth
            models::ApiKeyRole,
            models::ApiKeyCreateResponse,
            models::ApiKeyListItem,
            models::CreateApiKeyRequest,
            services::auth_admin::ListApiKeysResponse,
            services::auth_admin::RevokeApiKeyResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Tenants", description = "Tenant provisioning and administration"),
        (name = "Vehicles", description = "Sheet ingestion, search and status transitions"),
        (name = "Batches", description = "Upload batch history"),
        (name = "Dashboard", description = "Tenant aggregate statistics"),
        (name = "Templates", description = "Downloadable sheet templates"),
        (name = "Clients", description = "Tenant client roster"),
        (name = "FieldMappings", description = "Per-tenant header alias configuration"),
        (name = "Auth", description = "API key management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Key"),
                    ),
                ),
            );
        }
    }
}
