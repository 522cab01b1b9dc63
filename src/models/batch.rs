//! Upload batch DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Pagination;
use super::vehicle::VehicleClass;

/// Record counts per repossession status.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct StatusCounts {
    pub pending: i64,
    pub hold: i64,
    pub in_yard: i64,
    pub released: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    /// Sum across all statuses.
    pub fn total(&self) -> i64 {
        self.pending + self.hold + self.in_yard + self.released + self.cancelled
    }

    /// Scale every count; used for dashboard display inflation.
    pub fn scaled(&self, factor: i64) -> Self {
        Self {
            pending: self.pending * factor,
            hold: self.hold * factor,
            in_yard: self.in_yard * factor,
            released: self.released * factor,
            cancelled: self.cancelled * factor,
        }
    }
}

/// Batch entry in listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchSummary {
    /// Batch UUID.
    pub id: Uuid,
    /// Vehicle class the sheet was ingested into.
    pub vehicle_class: VehicleClass,
    /// Original filename.
    pub file_name: String,
    /// Name of the API key that performed the upload.
    pub uploaded_by: String,
    /// Data rows in the sheet.
    pub total_rows: i32,
    /// Rows persisted.
    pub inserted_rows: i32,
    /// Rows suppressed as intra-batch duplicates.
    pub duplicate_rows: i32,
    /// Rows rejected.
    pub rejected_rows: i32,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// Full batch detail including live status counters.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchDetail {
    /// Batch UUID.
    pub id: Uuid,
    /// Vehicle class the sheet was ingested into.
    pub vehicle_class: VehicleClass,
    /// Original filename.
    pub file_name: String,
    /// Name of the API key that performed the upload.
    pub uploaded_by: String,
    /// S3 key of the archived raw file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
    /// Header resolution snapshot recorded at ingest time.
    pub header_map: JsonValue,
    /// Data rows in the sheet.
    pub total_rows: i32,
    /// Rows persisted.
    pub inserted_rows: i32,
    /// Rows suppressed as intra-batch duplicates.
    pub duplicate_rows: i32,
    /// Rows rejected.
    pub rejected_rows: i32,
    /// Current status distribution of the batch's records (raw counts).
    pub status_counts: StatusCounts,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
    /// Last counter update.
    pub updated_at: DateTime<Utc>,
}

/// Paginated batch listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchListResponse {
    pub batches: Vec<BatchSummary>,
    pub pagination: Pagination,
}
