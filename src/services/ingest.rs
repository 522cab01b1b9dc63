//! Spreadsheet ingestion pipeline.
//!
//! Orchestrates one upload end to end: multipart read, format decoding,
//! header resolution, row staging, S3 archival and chunked inserts, then
//! the batch row that makes the whole thing visible. Staging is pure and
//! tested here; everything stateful goes through `DbPool` and `Storage`.

use std::collections::HashSet;

use actix_multipart::Multipart;
use futures_util::StreamExt;
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::partition::TenantScope;
use crate::db::upload_batches::NewBatch;
use crate::error::{AppError, AppResult};
use crate::models::{
    AliasMap, CanonicalField, DuplicateRowWarning, IngestResponse, IngestWarning, ROW_REPORT_CAP,
    RowError, StagedRecord, VehicleClass,
};
use crate::services::header_map::{self, ColumnTarget, HeaderMap};
use crate::services::spreadsheet::{self, Sheet};
use crate::services::storage::Storage;

/// Read the uploaded spreadsheet out of a multipart payload.
///
/// Looks for the field named `file`, enforcing the size ceiling while the
/// bytes stream in so an oversized upload is cut off early. Other fields
/// are drained and ignored.
pub async fn read_spreadsheet_field(
    payload: &mut Multipart,
    max_file_size: usize,
) -> AppResult<(String, Vec<u8>)> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;

        if content_disposition.get_name() != Some("file") {
            // Drain so the remaining fields stay readable.
            while let Some(chunk) = field.next().await {
                let _ = chunk;
            }
            continue;
        }

        let file_name = content_disposition
            .get_filename()
            .map(|name| name.replace('\\', "/"))
            .and_then(|name| name.rsplit('/').next().map(|base| base.to_string()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "upload.csv".to_string());

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > max_file_size {
                return Err(AppError::FileTooLarge {
                    size: data.len() + chunk.len(),
                    limit: max_file_size,
                });
            }
            data.extend_from_slice(&chunk);
        }

        return Ok((file_name, data));
    }

    Err(AppError::InvalidInput(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// Uppercase-alphanumeric normalization for registration and chassis
/// numbers. "mh-12 ab 1234" and "MH12AB1234" collapse to the same key.
pub(crate) fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Parse an EMI cell leniently.
///
/// Sheets write amounts as "₹4,500", "Rs. 4500/-", "INR 4500.50" and worse.
/// Currency markers, separators and the trailing "/-" are stripped before
/// the decimal parse; anything still unparseable is the caller's warning.
fn parse_emi(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '₹')
        .collect();

    let lower = cleaned.to_lowercase();
    for prefix in ["rs.", "rs", "inr"] {
        if lower.starts_with(prefix) {
            // Safe to slice: the matched prefix is pure ASCII.
            cleaned = cleaned[prefix.len()..].to_string();
            break;
        }
    }
    let cleaned = cleaned.strip_suffix("/-").unwrap_or(&cleaned);

    cleaned.parse::<Decimal>().ok()
}

/// What staging made of a sheet's data rows.
///
/// `records[i]` was staged from data row `source_rows[i]`; the two vectors
/// stay aligned so chunked inserts can report source row ranges.
pub struct StagingOutcome {
    pub records: Vec<StagedRecord>,
    pub source_rows: Vec<usize>,
    pub errors: Vec<RowError>,
    pub warnings: Vec<IngestWarning>,
    pub duplicates: usize,
}

/// Stage a sheet's rows against resolved headers. Pure.
///
/// A row survives unless its registration number is missing or empty after
/// normalization, or it duplicates an earlier row on (registration number,
/// normalized chassis number). Unparseable EMI cells downgrade to a warning
/// and the row is kept without the amount.
pub fn stage_rows(sheet: &Sheet, map: &HeaderMap) -> StagingOutcome {
    let mut records = Vec::new();
    let mut source_rows = Vec::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut duplicates = 0usize;
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (idx, row) in sheet.rows.iter().enumerate() {
        let row_no = idx + 1;

        let cell = |field: CanonicalField| -> Option<String> {
            map.position_of(field)
                .and_then(|pos| row.get(pos))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string())
        };

        let registration_no = cell(CanonicalField::RegistrationNo)
            .as_deref()
            .map(normalize_identifier)
            .unwrap_or_default();
        if registration_no.is_empty() {
            errors.push(RowError {
                row: row_no,
                reason: "Missing registration number".to_string(),
            });
            continue;
        }

        let chassis_no = cell(CanonicalField::ChassisNo);
        let chassis_key = chassis_no
            .as_deref()
            .map(normalize_identifier)
            .unwrap_or_default();
        if !seen.insert((registration_no.clone(), chassis_key)) {
            duplicates += 1;
            warnings.push(IngestWarning::Duplicate(DuplicateRowWarning {
                row: row_no,
                registration_no: registration_no.clone(),
            }));
            continue;
        }

        let emi_amount = match cell(CanonicalField::EmiAmount) {
            Some(raw) => match parse_emi(&raw) {
                Some(amount) => Some(amount),
                None => {
                    warnings.push(IngestWarning::Cell {
                        row: row_no,
                        field: CanonicalField::EmiAmount.as_str().to_string(),
                        reason: format!("Unparseable amount '{}'", raw),
                    });
                    None
                }
            },
            None => None,
        };

        let mut extra = Map::new();
        for (pos, (header, target)) in map.columns().iter().enumerate() {
            if matches!(target, ColumnTarget::Extra(_)) {
                if let Some(value) = row.get(pos).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                    extra.insert(header.clone(), JsonValue::String(value.to_string()));
                }
            }
        }

        records.push(StagedRecord {
            registration_no,
            chassis_no,
            engine_no: cell(CanonicalField::EngineNo),
            loan_no: cell(CanonicalField::LoanNo),
            customer_name: cell(CanonicalField::CustomerName),
            bank_name: cell(CanonicalField::BankName),
            make_model: cell(CanonicalField::MakeModel),
            branch: cell(CanonicalField::Branch),
            emi_amount,
            address: cell(CanonicalField::Address),
            extra,
        });
        source_rows.push(row_no);
    }

    StagingOutcome {
        records,
        source_rows,
        errors,
        warnings,
        duplicates,
    }
}

/// Cap both report lists at [`ROW_REPORT_CAP`], summarizing the overflow
/// from either list in one trailing `Truncated` warning.
fn cap_row_reports(
    mut errors: Vec<RowError>,
    mut warnings: Vec<IngestWarning>,
) -> (Vec<RowError>, Vec<IngestWarning>) {
    let omitted_errors = errors.len().saturating_sub(ROW_REPORT_CAP);
    errors.truncate(ROW_REPORT_CAP);

    let omitted_warnings = warnings.len().saturating_sub(ROW_REPORT_CAP);
    warnings.truncate(ROW_REPORT_CAP);

    let omitted = omitted_errors + omitted_warnings;
    if omitted > 0 {
        warnings.push(IngestWarning::Truncated { omitted });
    }

    (errors, warnings)
}

/// Run one upload through the full pipeline.
///
/// Order matters: nothing is persisted until the sheet has decoded, mapped
/// and staged at least one valid row, and the raw file is archived to S3
/// before the first insert. Chunks are all-or-nothing individually; a
/// failed chunk rejects its rows and later chunks still run. The batch row
/// goes in last, so a crash mid-insert leaves only orphaned records for
/// the reconciliation sweep to collect.
#[allow(clippy::too_many_arguments)]
pub async fn ingest_spreadsheet(
    pool: &DbPool,
    storage: &Storage,
    scope: &TenantScope,
    class: VehicleClass,
    uploaded_by: &str,
    file_name: &str,
    bytes: Vec<u8>,
    insert_chunk_size: usize,
) -> AppResult<IngestResponse> {
    let partition = scope.partition(class);

    let sheet = spreadsheet::parse(&bytes)?;
    if sheet.rows.is_empty() {
        return Err(AppError::InvalidInput(
            "File contains a header row but no data rows".to_string(),
        ));
    }

    let tenant_aliases = load_tenant_aliases(pool, scope).await?;
    let map = header_map::resolve_headers(&sheet.header, tenant_aliases.as_ref())?;

    let outcome = stage_rows(&sheet, &map);
    if outcome.records.is_empty() {
        return Err(AppError::InvalidInput(
            "No valid rows in file; every row was rejected".to_string(),
        ));
    }

    let batch_id = Uuid::now_v7();
    let total_rows = sheet.rows.len();

    // Archive before any insert. A storage failure aborts the whole upload
    // rather than leaving records without their source file.
    let source_key = Storage::upload_key(partition.tenant_id(), batch_id, file_name);
    let extension = file_name.rsplit('.').next().unwrap_or("");
    storage
        .put(
            &source_key,
            bytes,
            Some(Storage::content_type_for_extension(extension)),
        )
        .await?;

    let mut errors = outcome.errors;
    let mut inserted = 0usize;
    let mut rejected = errors.len();

    let mut start = 0usize;
    while start < outcome.records.len() {
        let end = (start + insert_chunk_size).min(outcome.records.len());
        let chunk = &outcome.records[start..end];

        match pool.insert_records_chunk(&partition, batch_id, chunk).await {
            Ok(()) => inserted += chunk.len(),
            Err(e) => {
                let first = outcome.source_rows[start];
                let last = outcome.source_rows[end - 1];
                error!(
                    "Insert chunk failed for batch {} (rows {}-{}): {}",
                    batch_id, first, last, e
                );
                rejected += chunk.len();
                errors.push(RowError {
                    row: first,
                    reason: format!("Insert failed; rows {}-{} were not stored", first, last),
                });
            }
        }

        start = end;
    }

    pool.insert_batch(
        &partition,
        NewBatch {
            id: batch_id,
            file_name: file_name.to_string(),
            uploaded_by: uploaded_by.to_string(),
            source_key: Some(source_key),
            header_map: map.to_json(),
            total_rows: total_rows as i32,
            inserted_rows: inserted as i32,
            duplicate_rows: outcome.duplicates as i32,
            rejected_rows: rejected as i32,
        },
    )
    .await?;

    info!(
        "Ingested {} into batch {}: {} rows, {} inserted, {} duplicates, {} rejected",
        file_name, batch_id, total_rows, inserted, outcome.duplicates, rejected
    );

    let (errors, warnings) = cap_row_reports(errors, outcome.warnings);

    Ok(IngestResponse {
        batch_id,
        file_name: file_name.to_string(),
        total_rows: total_rows as i32,
        inserted_rows: inserted as i32,
        duplicate_rows: outcome.duplicates as i32,
        rejected_rows: rejected as i32,
        errors,
        warnings,
    })
}

/// Load the tenant's alias overlay, if it has one.
async fn load_tenant_aliases(pool: &DbPool, scope: &TenantScope) -> AppResult<Option<AliasMap>> {
    match pool.get_field_mapping(scope).await? {
        Some(mapping) => {
            let aliases: AliasMap = serde_json::from_value(mapping.aliases)
                .map_err(|e| AppError::Database(format!("Stored field mapping is corrupt: {}", e)))?;
            Ok(Some(aliases))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::header_map::resolve_headers;
    use crate::services::spreadsheet::Delimiter;

    fn sheet(header: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet {
            delimiter: Delimiter::Comma,
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn resolve(sheet: &Sheet) -> HeaderMap {
        resolve_headers(&sheet.header, None).unwrap()
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("mh-12 ab 1234"), "MH12AB1234");
        assert_eq!(normalize_identifier(" ka01cd5678 "), "KA01CD5678");
        assert_eq!(normalize_identifier("--- "), "");
    }

    #[test]
    fn test_parse_emi_variants() {
        assert_eq!(parse_emi("4500"), Some(Decimal::new(4500, 0)));
        assert_eq!(parse_emi("₹4,500"), Some(Decimal::new(4500, 0)));
        assert_eq!(parse_emi("Rs. 4500/-"), Some(Decimal::new(4500, 0)));
        assert_eq!(parse_emi("INR 4500.50"), Some(Decimal::new(450050, 2)));
        assert_eq!(parse_emi("rs4500"), Some(Decimal::new(4500, 0)));
        assert_eq!(parse_emi("N/A"), None);
        assert_eq!(parse_emi("4.5.0"), None);
    }

    #[test]
    fn test_stage_rows_maps_cells() {
        let s = sheet(
            &["Reg No", "Customer Name", "EMI", "Remark"],
            &[&["mh12 ab 1234", "Patil", "₹4,500", "call first"]],
        );
        let outcome = stage_rows(&s, &resolve(&s));

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.registration_no, "MH12AB1234");
        assert_eq!(record.customer_name.as_deref(), Some("Patil"));
        assert_eq!(record.emi_amount, Some(Decimal::new(4500, 0)));
        assert_eq!(
            record.extra.get("Remark").and_then(|v| v.as_str()),
            Some("call first")
        );
        assert_eq!(outcome.source_rows, vec![1]);
    }

    #[test]
    fn test_stage_rows_rejects_missing_registration() {
        let s = sheet(
            &["Reg No", "Customer Name"],
            &[&["", "Patil"], &["KA01CD5678", "Rao"], &["---", "Shah"]],
        );
        let outcome = stage_rows(&s, &resolve(&s));

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors[0].row, 1);
        assert_eq!(outcome.errors[1].row, 3);
    }

    #[test]
    fn test_stage_rows_dedupes_on_registration_and_chassis() {
        let s = sheet(
            &["Reg No", "Chassis No"],
            &[
                &["MH12AB1234", "CH-001"],
                &["mh 12 ab 1234", "ch001"],
                &["MH12AB1234", "CH-002"],
            ],
        );
        let outcome = stage_rows(&s, &resolve(&s));

        // Same reg + same chassis collapses; same reg + new chassis survives.
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.duplicates, 1);
        assert!(matches!(
            outcome.warnings[0],
            IngestWarning::Duplicate(DuplicateRowWarning { row: 2, .. })
        ));
    }

    #[test]
    fn test_stage_rows_emi_failure_keeps_row() {
        let s = sheet(&["Reg No", "EMI"], &[&["MH12AB1234", "four thousand"]]);
        let outcome = stage_rows(&s, &resolve(&s));

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].emi_amount, None);
        assert!(matches!(
            outcome.warnings[0],
            IngestWarning::Cell { row: 1, .. }
        ));
    }

    #[test]
    fn test_stage_rows_short_row_yields_none_cells() {
        let s = sheet(&["Reg No", "Customer Name", "Bank"], &[&["MH12AB1234"]]);
        let outcome = stage_rows(&s, &resolve(&s));

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].customer_name, None);
        assert_eq!(outcome.records[0].bank_name, None);
    }

    #[test]
    fn test_cap_row_reports_truncates_and_summarizes() {
        let errors: Vec<RowError> = (1..=150)
            .map(|row| RowError {
                row,
                reason: "Missing registration number".to_string(),
            })
            .collect();
        let warnings: Vec<IngestWarning> = (1..=120)
            .map(|row| {
                IngestWarning::Duplicate(DuplicateRowWarning {
                    row,
                    registration_no: "MH12AB1234".to_string(),
                })
            })
            .collect();

        let (errors, warnings) = cap_row_reports(errors, warnings);

        assert_eq!(errors.len(), ROW_REPORT_CAP);
        assert_eq!(warnings.len(), ROW_REPORT_CAP + 1);
        assert!(matches!(
            warnings.last(),
            Some(IngestWarning::Truncated { omitted: 70 })
        ));
    }

    #[test]
    fn test_cap_row_reports_no_summary_when_under_cap() {
        let (errors, warnings) = cap_row_reports(
            vec![RowError {
                row: 1,
                reason: "Missing registration number".to_string(),
            }],
            Vec::new(),
        );
        assert_eq!(errors.len(), 1);
        assert!(warnings.is_empty());
    }
}
