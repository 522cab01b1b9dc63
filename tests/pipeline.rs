//! Integration tests for the ingestion pipeline's pure stages.
//!
//! Drives uploaded bytes through decode, header resolution and row
//! staging the same way the upload handler does, without a database.

use repotrack_lib::error::AppError;
use repotrack_lib::models::{
    AliasMap, CANONICAL_FIELDS, CanonicalField, IngestWarning, SearchMode,
};
use repotrack_lib::services::header_map::resolve_headers;
use repotrack_lib::services::ingest::{StagingOutcome, stage_rows};
use repotrack_lib::services::search::classify;
use repotrack_lib::services::spreadsheet::{self, Delimiter};

/// Parse, resolve and stage one upload without tenant aliases.
fn run_pipeline(bytes: &[u8]) -> StagingOutcome {
    let sheet = spreadsheet::parse(bytes).unwrap();
    let map = resolve_headers(&sheet.header, None).unwrap();
    stage_rows(&sheet, &map)
}

/// A realistic bank export: BOM, CRLF endings, aliased headers, currency
/// formatting and a quoted address holding commas.
#[test]
fn test_messy_bank_sheet_end_to_end() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(
        b"Vehicle No,Chasis No,Borrower Name,EMI (Rs.),Financier,Agent Remark,Address\r\n\
          mh-12 ab 1234,MB1JF48,Sunil Patil,\"Rs. 4,500/-\",HDFC Bank,call first,\"12, MG Road, Pune\"\r\n\
          KA01CD5678,,Meena Rao,6200,Shriram Finance,,Hubli\r\n",
    );

    let outcome = run_pipeline(&bytes);

    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.errors.is_empty());

    let first = &outcome.records[0];
    assert_eq!(first.registration_no, "MH12AB1234");
    assert_eq!(first.chassis_no.as_deref(), Some("MB1JF48"));
    assert_eq!(first.customer_name.as_deref(), Some("Sunil Patil"));
    assert_eq!(first.bank_name.as_deref(), Some("HDFC Bank"));
    assert_eq!(
        first.emi_amount,
        Some(rust_decimal::Decimal::new(4500, 0))
    );
    assert_eq!(first.address.as_deref(), Some("12, MG Road, Pune"));
    assert_eq!(
        first.extra.get("Agent Remark").and_then(|v| v.as_str()),
        Some("call first")
    );

    let second = &outcome.records[1];
    assert_eq!(second.registration_no, "KA01CD5678");
    assert_eq!(second.chassis_no, None);
    assert!(second.extra.is_empty());
}

/// Tab-separated exports are sniffed from the header line and a tenant's
/// alias overlay binds columns the built-in table does not know.
#[test]
fn test_tsv_export_with_tenant_aliases() {
    let bytes = b"Reg No\tFile No\tCustomer Name\nDL1CAA1234\tLN-2041\tRamesh Kumar\n";

    let sheet = spreadsheet::parse(bytes).unwrap();
    assert_eq!(sheet.delimiter, Delimiter::Tab);

    let mut aliases = AliasMap::new();
    aliases.insert(CanonicalField::LoanNo, vec!["File No".to_string()]);

    let map = resolve_headers(&sheet.header, Some(&aliases)).unwrap();
    let outcome = stage_rows(&sheet, &map);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].loan_no.as_deref(), Some("LN-2041"));
}

/// Every data row is accounted for exactly once across inserted records,
/// rejected rows and suppressed duplicates.
#[test]
fn test_mixed_quality_sheet_counts_reconcile() {
    let bytes = b"Reg No,Chassis No,EMI\n\
        MH12AB1234,CH001,4500\n\
        ,CH002,3000\n\
        mh 12 ab 1234,ch-001,4500\n\
        KA01CD5678,CH003,not a number\n\
        ---,CH004,1200\n";

    let outcome = run_pipeline(bytes);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(
        outcome.records.len() + outcome.errors.len() + outcome.duplicates,
        5
    );

    // Rows are reported by their position among data rows.
    assert_eq!(outcome.errors[0].row, 2);
    assert_eq!(outcome.errors[1].row, 5);

    let dup_rows: Vec<usize> = outcome
        .warnings
        .iter()
        .filter_map(|w| match w {
            IngestWarning::Duplicate(d) => Some(d.row),
            _ => None,
        })
        .collect();
    assert_eq!(dup_rows, vec![3]);

    let cell_warnings: Vec<usize> = outcome
        .warnings
        .iter()
        .filter_map(|w| match w {
            IngestWarning::Cell { row, .. } => Some(*row),
            _ => None,
        })
        .collect();
    assert_eq!(cell_warnings, vec![4]);
}

/// A registration number staged from a messy cell must equal the term an
/// exact search produces for the same plate typed differently; otherwise
/// ingested vehicles are unfindable.
#[test]
fn test_staged_registration_matches_exact_search_term() {
    let outcome = run_pipeline(b"Reg No\nmh-12 ab 1234\n");
    let staged = &outcome.records[0].registration_no;

    let (mode, term) = classify("MH 12AB1234").unwrap();
    assert_eq!(mode, SearchMode::Exact);
    assert_eq!(&term, staged);
}

/// The last four digits of a staged plate classify as a suffix search.
#[test]
fn test_suffix_of_staged_plate_classifies_as_suffix() {
    let outcome = run_pipeline(b"Reg No\nKA01CD5678\n");
    let staged = &outcome.records[0].registration_no;
    let suffix = &staged[staged.len() - 4..];

    let (mode, term) = classify(suffix).unwrap();
    assert_eq!(mode, SearchMode::Suffix);
    assert_eq!(term, "5678");
}

/// Binary workbooks are refused before header resolution ever runs.
#[test]
fn test_workbook_rejected_before_header_resolution() {
    let err = spreadsheet::parse(b"PK\x03\x04fake-xlsx-content").unwrap_err();
    assert!(matches!(err, AppError::UnsupportedFormat(_)));
}

/// A sheet that never names the registration column is unusable no matter
/// how clean its rows are.
#[test]
fn test_sheet_without_registration_column_rejected() {
    let sheet = spreadsheet::parse(b"Customer Name,Bank\nPatil,HDFC\n").unwrap();
    let err = resolve_headers(&sheet.header, None).unwrap_err();
    assert!(matches!(err, AppError::Schema(_)));
}

/// The downloadable template must itself be ingestible: every column
/// resolves to its canonical field, in template order, with no aliases.
#[test]
fn test_template_headers_resolve_in_order() {
    let header_line = CANONICAL_FIELDS
        .iter()
        .map(|f| f.template_header())
        .collect::<Vec<_>>()
        .join(",");
    let bytes = format!("{}\r\nMH12AB1234,,,,,,,,,\r\n", header_line);

    let sheet = spreadsheet::parse(bytes.as_bytes()).unwrap();
    let map = resolve_headers(&sheet.header, None).unwrap();

    for (idx, field) in CANONICAL_FIELDS.iter().enumerate() {
        assert_eq!(map.position_of(*field), Some(idx), "{} misplaced", field);
    }

    let outcome = stage_rows(&sheet, &map);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].registration_no, "MH12AB1234");
}
