//! Search DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::vehicle::VehicleSummary;

/// How a sanitized query is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Exactly four digits: match the last four digits of the registration.
    Suffix,
    /// A full plate: exact match on the normalized registration number.
    Exact,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Suffix => "suffix",
            Self::Exact => "exact",
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters for vehicle search.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SearchParams {
    /// Raw query text: a full registration number or its last four digits.
    pub q: String,
}

/// Search response. Results are grouped by vehicle class in canonical
/// partition order; counts are raw and unaffected by the tenant's
/// display multiplier.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Sanitized query actually executed.
    pub query: String,
    /// Mode the query was classified into.
    pub mode: SearchMode,
    /// Total matches returned (after per-class caps).
    pub total: usize,
    /// Matching vehicles.
    pub results: Vec<VehicleSummary>,
}
