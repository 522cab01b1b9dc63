//! Domain models for the RepoTrack server.

use utoipa::ToSchema;

pub mod api_key;
pub mod batch;
pub mod dashboard;
pub mod ingest;
pub mod mapping;
pub mod search;
pub mod tenant;
pub mod vehicle;

// Re-export commonly used types
pub use api_key::{
    ApiKey, ApiKeyCreateResponse, ApiKeyListItem, ApiKeyRole, AuthenticatedCaller,
    CreateApiKeyRequest,
};
pub use batch::{BatchDetail, BatchListResponse, BatchSummary, StatusCounts};
pub use dashboard::{ClassStats, DashboardResponse};
pub use ingest::{
    DuplicateRowWarning, IngestResponse, IngestWarning, ROW_REPORT_CAP, RowError, StagedRecord,
};
pub use mapping::{
    AliasMap, CANONICAL_FIELDS, CanonicalField, FieldMappingResponse, UpdateFieldMappingRequest,
};
pub use search::{SearchMode, SearchParams, SearchResponse};
pub use tenant::{
    ClientResponse, CreateClientRequest, CreateTenantRequest, OrgType, TenantResponse,
    UpdateTenantRequest,
};
pub use vehicle::{
    StatusEventResponse, TransitionRequest, VEHICLE_CLASSES, VehicleClass, VehicleDetail,
    VehicleStatus, VehicleSummary,
};

/// Pagination parameters.
#[derive(Debug, Clone, serde::Deserialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    100
}

impl PaginationParams {
    /// Calculate the offset for database queries.
    pub fn offset(&self) -> u32 {
        let page = self.page.unwrap_or(default_page());
        let limit = self.limit.unwrap_or(default_limit());
        (page.saturating_sub(1)) * limit
    }

    /// Clamp limit to maximum allowed value.
    pub fn clamped_limit(&self) -> u32 {
        self.limit.unwrap_or(default_limit()).min(100)
    }

    /// Page number actually served.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(default_page())
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };

        Pagination {
            page,
            limit,
            total,
            total_pages,
        }
    }
}
