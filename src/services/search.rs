//! Registration-number search across a tenant's partitions.
//!
//! Two query shapes, nothing else: the last four digits of a plate, or a
//! complete plate. Everything other than those two is rejected with
//! guidance instead of guessing, because field staff type queries from
//! memory on bad connections and a silent empty result reads as "vehicle
//! is clean".

use uuid::Uuid;

use crate::db::DbPool;
use crate::db::partition::TenantScope;
use crate::entity::{status_event, vehicle_record};
use crate::error::{AppError, AppResult};
use crate::models::{
    SearchMode, SearchResponse, StatusEventResponse, VehicleClass, VehicleDetail, VehicleStatus,
    VehicleSummary,
};
use crate::services::ingest::normalize_identifier;

/// Sanitize and classify a raw query.
///
/// Returns the executed search term (uppercase alphanumeric) with its
/// mode: exactly four digits is a suffix search, a full Indian plate
/// (2 letters, 1-2 digits, 0-3 letters, 4 digits) is an exact search.
pub fn classify(raw: &str) -> AppResult<(SearchMode, String)> {
    let sanitized = normalize_identifier(raw);

    if sanitized.is_empty() {
        return Err(AppError::InvalidQuery(
            "Query contains no letters or digits".to_string(),
        ));
    }

    if sanitized.bytes().all(|b| b.is_ascii_digit()) {
        if sanitized.len() == 4 {
            return Ok((SearchMode::Suffix, sanitized));
        }
        return Err(AppError::InvalidQuery(format!(
            "Digit queries must be exactly the last 4 digits of the registration number; got {} digits",
            sanitized.len()
        )));
    }

    if matches_plate(&sanitized) {
        return Ok((SearchMode::Exact, sanitized));
    }

    Err(AppError::InvalidQuery(
        "Query must be a full registration number (e.g. MH12AB1234) or its last 4 digits"
            .to_string(),
    ))
}

/// Indian registration plate shape: 2 letters (state), 1-2 digits
/// (district), 0-3 letters (series), 4 digits. Input is already
/// uppercase alphanumeric.
fn matches_plate(s: &str) -> bool {
    let b = s.as_bytes();
    let n = b.len();

    // 2 + 1 + 0 + 4 = 7 at the shortest, 2 + 2 + 3 + 4 = 11 at the longest.
    if !(7..=11).contains(&n) {
        return false;
    }
    if !b[..2].iter().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !b[n - 4..].iter().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let middle = &b[2..n - 4];
    let district = middle.iter().take_while(|c| c.is_ascii_digit()).count();
    if !(1..=2).contains(&district) {
        return false;
    }

    let series = &middle[district..];
    series.len() <= 3 && series.iter().all(|c| c.is_ascii_alphabetic())
}

/// Run one search across all three partitions of the tenant.
///
/// The partitions are queried concurrently and merged in canonical class
/// order. Counts are raw row counts; the display multiplier never applies
/// to search.
pub async fn run_search(
    pool: &DbPool,
    scope: &TenantScope,
    raw_query: &str,
    per_class_cap: u64,
) -> AppResult<SearchResponse> {
    let (mode, term) = classify(raw_query)?;
    let [two, four, commercial] = scope.partitions();

    let (two_hits, four_hits, commercial_hits) = match mode {
        SearchMode::Suffix => tokio::try_join!(
            pool.search_records_by_suffix(&two, &term, per_class_cap),
            pool.search_records_by_suffix(&four, &term, per_class_cap),
            pool.search_records_by_suffix(&commercial, &term, per_class_cap),
        )?,
        SearchMode::Exact => tokio::try_join!(
            pool.search_records_by_plate(&two, &term, per_class_cap),
            pool.search_records_by_plate(&four, &term, per_class_cap),
            pool.search_records_by_plate(&commercial, &term, per_class_cap),
        )?,
    };

    let results = two_hits
        .into_iter()
        .chain(four_hits)
        .chain(commercial_hits)
        .map(summarize)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(SearchResponse {
        query: term,
        mode,
        total: results.len(),
        results,
    })
}

/// Tenant-scoped record detail with its full status history.
pub async fn fetch_detail(
    pool: &DbPool,
    scope: &TenantScope,
    record_id: Uuid,
) -> AppResult<VehicleDetail> {
    let record = pool.get_record(scope, record_id).await?;
    let events = pool.get_status_history(record_id).await?;
    detail_from_parts(record, events)
}

/// Assemble the detail response from already-fetched rows.
pub(crate) fn detail_from_parts(
    record: vehicle_record::Model,
    events: Vec<status_event::Model>,
) -> AppResult<VehicleDetail> {
    let status_history = events
        .into_iter()
        .map(|event| {
            Ok(StatusEventResponse {
                from_status: stored_status(event.record_id, &event.from_status)?,
                to_status: stored_status(event.record_id, &event.to_status)?,
                actor: event.actor,
                via_override: event.via_override,
                yard_name: event.yard_name,
                yard_location: event.yard_location,
                created_at: event.created_at,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(VehicleDetail {
        id: record.id,
        vehicle_class: stored_class(record.id, &record.vehicle_class)?,
        batch_id: record.batch_id,
        registration_no: record.registration_no,
        chassis_no: record.chassis_no,
        engine_no: record.engine_no,
        loan_no: record.loan_no,
        customer_name: record.customer_name,
        bank_name: record.bank_name,
        make_model: record.make_model,
        branch: record.branch,
        emi_amount: record.emi_amount,
        address: record.address,
        extra: record.extra,
        status: stored_status(record.id, &record.status)?,
        yard_name: record.yard_name,
        yard_location: record.yard_location,
        created_at: record.created_at,
        updated_at: record.updated_at,
        status_history,
    })
}

fn summarize(record: vehicle_record::Model) -> AppResult<VehicleSummary> {
    Ok(VehicleSummary {
        id: record.id,
        vehicle_class: stored_class(record.id, &record.vehicle_class)?,
        registration_no: record.registration_no,
        chassis_no: record.chassis_no,
        loan_no: record.loan_no,
        customer_name: record.customer_name,
        bank_name: record.bank_name,
        make_model: record.make_model,
        status: stored_status(record.id, &record.status)?,
    })
}

fn stored_class(record_id: Uuid, raw: &str) -> AppResult<VehicleClass> {
    VehicleClass::parse(raw).ok_or_else(|| {
        AppError::Database(format!(
            "Record {} has unknown vehicle class '{}'",
            record_id, raw
        ))
    })
}

fn stored_status(record_id: Uuid, raw: &str) -> AppResult<VehicleStatus> {
    VehicleStatus::parse(raw).ok_or_else(|| {
        AppError::Database(format!(
            "Record {} has unknown status '{}'",
            record_id, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_digits_is_suffix() {
        let (mode, term) = classify("1234").unwrap();
        assert_eq!(mode, SearchMode::Suffix);
        assert_eq!(term, "1234");
    }

    #[test]
    fn test_punctuation_stripped_before_classification() {
        let (mode, term) = classify(" 12-34 ").unwrap();
        assert_eq!(mode, SearchMode::Suffix);
        assert_eq!(term, "1234");
    }

    #[test]
    fn test_short_and_long_digit_runs_rejected() {
        assert!(matches!(classify("123"), Err(AppError::InvalidQuery(_))));
        assert!(matches!(classify("12345"), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_full_plate_is_exact() {
        let (mode, term) = classify("mh 12 ab 1234").unwrap();
        assert_eq!(mode, SearchMode::Exact);
        assert_eq!(term, "MH12AB1234");
    }

    #[test]
    fn test_plate_without_series_letters() {
        // MH + 12 + (no series) + 1234
        let (mode, _) = classify("MH121234").unwrap();
        assert_eq!(mode, SearchMode::Exact);
    }

    #[test]
    fn test_plate_with_single_district_digit() {
        // DL + 1 + CAA + 1234
        let (mode, _) = classify("DL1CAA1234").unwrap();
        assert_eq!(mode, SearchMode::Exact);
    }

    #[test]
    fn test_trailing_letter_rejected() {
        assert!(matches!(classify("1234A"), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_malformed_plates_rejected() {
        // No district digits.
        assert!(classify("MHAB1234").is_err());
        // Series too long.
        assert!(classify("MH12ABCD1234").is_err());
        // Too short overall.
        assert!(classify("MH1234").is_err());
    }

    #[test]
    fn test_empty_and_symbol_queries_rejected() {
        assert!(matches!(classify(""), Err(AppError::InvalidQuery(_))));
        assert!(matches!(classify("--- "), Err(AppError::InvalidQuery(_))));
    }
}
