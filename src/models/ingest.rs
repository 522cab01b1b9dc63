//! Ingestion DTOs: upload responses and row-level error reporting.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum row errors/warnings carried in an ingest response. Anything past
/// the cap is summarized in a final entry.
pub const ROW_REPORT_CAP: usize = 100;

/// A validated, normalized row ready for insertion.
#[derive(Debug, Clone)]
pub struct StagedRecord {
    /// Normalized registration number (uppercase alphanumeric).
    pub registration_no: String,
    pub chassis_no: Option<String>,
    pub engine_no: Option<String>,
    pub loan_no: Option<String>,
    pub customer_name: Option<String>,
    pub bank_name: Option<String>,
    pub make_model: Option<String>,
    pub branch: Option<String>,
    pub emi_amount: Option<Decimal>,
    pub address: Option<String>,
    /// Unmapped source cells, original header -> verbatim value.
    pub extra: Map<String, JsonValue>,
}

/// A row that was skipped during ingestion. Row numbers are 1-based data-row
/// indexes (the header line is row 0).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RowError {
    /// 1-based data row number.
    pub row: usize,
    /// Why the row was skipped.
    pub reason: String,
}

/// A row suppressed as an intra-batch duplicate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DuplicateRowWarning {
    /// 1-based data row number of the suppressed duplicate.
    pub row: usize,
    /// Normalized registration number shared with the earlier row.
    pub registration_no: String,
}

/// Response returned after an upload is fully processed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestResponse {
    /// Upload batch UUID.
    pub batch_id: Uuid,
    /// Original filename.
    pub file_name: String,
    /// Data rows in the sheet (excluding the header line).
    pub total_rows: i32,
    /// Rows persisted.
    pub inserted_rows: i32,
    /// Rows suppressed as intra-batch duplicates.
    pub duplicate_rows: i32,
    /// Rows rejected by validation or a failed insert chunk.
    pub rejected_rows: i32,
    /// Row-level rejections, capped at [`ROW_REPORT_CAP`].
    pub errors: Vec<RowError>,
    /// Non-fatal notes (duplicates, unparseable amounts), capped likewise.
    pub warnings: Vec<IngestWarning>,
}

/// Non-fatal ingest warning.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestWarning {
    /// Duplicate of an earlier row in the same file.
    Duplicate(DuplicateRowWarning),
    /// A cell could not be interpreted; the row was kept without it.
    Cell {
        /// 1-based data row number.
        row: usize,
        /// Canonical field the cell was mapped to.
        field: String,
        /// What went wrong.
        reason: String,
    },
    /// More entries existed than the response carries.
    Truncated {
        /// Number of entries not listed.
        omitted: usize,
    },
}
