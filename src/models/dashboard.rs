//! Dashboard DTOs.
//!
//! All record counts in these types are display values: the tenant's
//! data_multiplier has already been applied by the aggregation service.

use serde::Serialize;
use utoipa::ToSchema;

use super::batch::StatusCounts;
use super::vehicle::VehicleClass;

/// Aggregates for one vehicle class.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassStats {
    /// Vehicle class.
    pub vehicle_class: VehicleClass,
    /// Records currently held in the class.
    pub total_records: i64,
    /// Status distribution.
    pub statuses: StatusCounts,
    /// Sheets ingested into the class (not multiplied).
    pub batches: i64,
    /// Rows rejected across those sheets.
    pub rejected_rows: i64,
}

/// Tenant dashboard response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Records across all classes.
    pub total_records: i64,
    /// Status distribution across all classes.
    pub statuses: StatusCounts,
    /// Per-class breakdown in canonical class order.
    pub classes: Vec<ClassStats>,
    /// Sheets ingested overall (not multiplied).
    pub batches: i64,
    /// Rows rejected overall.
    pub rejected_rows: i64,
    /// Registered client names, alphabetical.
    pub clients: Vec<String>,
}
