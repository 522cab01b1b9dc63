//! Canonical header resolution for uploaded spreadsheets.
//!
//! Pure module: headers in, column assignments out. The built-in alias
//! table covers the headers that show up in common bank and NBFC
//! repossession sheets; a tenant's configured aliases overlay it and win
//! on collision.

use std::collections::{HashMap, HashSet};

use serde_json::{Value as JsonValue, json};

use crate::error::{AppError, AppResult};
use crate::models::{AliasMap, CANONICAL_FIELDS, CanonicalField};

/// Compiled-in aliases, already in normalized form.
///
/// The normalized `as_str` and template headers of every canonical field
/// are accepted implicitly and do not need entries here.
const BUILTIN_ALIASES: &[(&str, CanonicalField)] = &[
    ("regno", CanonicalField::RegistrationNo),
    ("regnno", CanonicalField::RegistrationNo),
    ("regdno", CanonicalField::RegistrationNo),
    ("registration", CanonicalField::RegistrationNo),
    ("registrationnumber", CanonicalField::RegistrationNo),
    ("regnumber", CanonicalField::RegistrationNo),
    ("vehicleno", CanonicalField::RegistrationNo),
    ("vehiclenumber", CanonicalField::RegistrationNo),
    ("vehicleregno", CanonicalField::RegistrationNo),
    ("chassis", CanonicalField::ChassisNo),
    ("chassisnumber", CanonicalField::ChassisNo),
    ("chasisno", CanonicalField::ChassisNo),
    ("chno", CanonicalField::ChassisNo),
    ("engine", CanonicalField::EngineNo),
    ("enginenumber", CanonicalField::EngineNo),
    ("engno", CanonicalField::EngineNo),
    ("loan", CanonicalField::LoanNo),
    ("loannumber", CanonicalField::LoanNo),
    ("loanaccountno", CanonicalField::LoanNo),
    ("agreementno", CanonicalField::LoanNo),
    ("agreementnumber", CanonicalField::LoanNo),
    ("accountno", CanonicalField::LoanNo),
    ("acno", CanonicalField::LoanNo),
    ("contractno", CanonicalField::LoanNo),
    ("prospectno", CanonicalField::LoanNo),
    ("customer", CanonicalField::CustomerName),
    ("custname", CanonicalField::CustomerName),
    ("borrowername", CanonicalField::CustomerName),
    ("hirername", CanonicalField::CustomerName),
    ("nameofcustomer", CanonicalField::CustomerName),
    ("clientname", CanonicalField::CustomerName),
    ("bank", CanonicalField::BankName),
    ("financier", CanonicalField::BankName),
    ("financiername", CanonicalField::BankName),
    ("lender", CanonicalField::BankName),
    ("nbfcname", CanonicalField::BankName),
    ("make", CanonicalField::MakeModel),
    ("model", CanonicalField::MakeModel),
    ("makeandmodel", CanonicalField::MakeModel),
    ("vehiclemake", CanonicalField::MakeModel),
    ("vehiclemodel", CanonicalField::MakeModel),
    ("assetdescription", CanonicalField::MakeModel),
    ("assetmodel", CanonicalField::MakeModel),
    ("product", CanonicalField::MakeModel),
    ("branchname", CanonicalField::Branch),
    ("dealingbranch", CanonicalField::Branch),
    ("emi", CanonicalField::EmiAmount),
    ("emiamt", CanonicalField::EmiAmount),
    ("emirs", CanonicalField::EmiAmount),
    ("monthlyemi", CanonicalField::EmiAmount),
    ("installment", CanonicalField::EmiAmount),
    ("instalment", CanonicalField::EmiAmount),
    ("addr", CanonicalField::Address),
    ("custaddress", CanonicalField::Address),
    ("customeraddress", CanonicalField::Address),
    ("residenceaddress", CanonicalField::Address),
    ("permanentaddress", CanonicalField::Address),
];

/// Where one sheet column lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnTarget {
    Canonical(CanonicalField),
    /// Unmapped column, retained verbatim under its header.
    Extra(String),
}

/// Resolved column assignments for one upload, in sheet column order.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    columns: Vec<(String, ColumnTarget)>,
}

impl HeaderMap {
    pub fn columns(&self) -> &[(String, ColumnTarget)] {
        &self.columns
    }

    /// Column index a canonical field was bound to, if any.
    pub fn position_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns
            .iter()
            .position(|(_, target)| *target == ColumnTarget::Canonical(field))
    }

    /// Snapshot stored on the batch row, one entry per sheet column.
    ///
    /// `target` is the canonical field name, or null for extra columns.
    pub fn to_json(&self) -> JsonValue {
        let entries: Vec<JsonValue> = self
            .columns
            .iter()
            .map(|(header, target)| {
                let target = match target {
                    ColumnTarget::Canonical(field) => json!(field.as_str()),
                    ColumnTarget::Extra(_) => JsonValue::Null,
                };
                json!({ "header": header, "target": target })
            })
            .collect();
        JsonValue::Array(entries)
    }
}

/// Normalize a header for alias comparison: lowercase, alphanumeric only.
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Assign every sheet column to a canonical field or an extra slot.
///
/// First column wins when two columns normalize to the same canonical
/// field; the loser stays in the sheet as an extra column. A sheet that
/// binds no column to the registration number is unusable and rejected.
pub fn resolve_headers(
    headers: &[String],
    tenant_aliases: Option<&AliasMap>,
) -> AppResult<HeaderMap> {
    let mut lookup: HashMap<String, CanonicalField> = HashMap::new();

    for field in CANONICAL_FIELDS {
        lookup.insert(normalize_header(field.as_str()), field);
        lookup.insert(normalize_header(field.template_header()), field);
    }
    for (alias, field) in BUILTIN_ALIASES {
        lookup.insert((*alias).to_string(), *field);
    }
    // Tenant aliases overlay the built-ins.
    if let Some(aliases) = tenant_aliases {
        for (field, names) in aliases {
            for name in names {
                let normalized = normalize_header(name);
                if !normalized.is_empty() {
                    lookup.insert(normalized, *field);
                }
            }
        }
    }

    let mut claimed: HashSet<CanonicalField> = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());

    for (idx, raw) in headers.iter().enumerate() {
        let display = if raw.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            raw.trim().to_string()
        };

        let target = match lookup.get(&normalize_header(raw)) {
            Some(&field) if !claimed.contains(&field) => {
                claimed.insert(field);
                ColumnTarget::Canonical(field)
            }
            _ => ColumnTarget::Extra(display.clone()),
        };
        columns.push((display, target));
    }

    let map = HeaderMap { columns };

    if map.position_of(CanonicalField::RegistrationNo).is_none() {
        return Err(AppError::Schema(
            "No column maps to the registration number; add a 'Registration No' column or configure an alias for it"
                .to_string(),
        ));
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Reg. No"), "regno");
        assert_eq!(normalize_header("REG NO"), "regno");
        assert_eq!(normalize_header("Registration Number"), "registrationnumber");
        assert_eq!(normalize_header("  EMI (Rs.) "), "emirs");
    }

    #[test]
    fn test_builtin_aliases_resolve() {
        let map = resolve_headers(
            &headers(&["Reg. No", "Chasis No", "Borrower Name", "Financier"]),
            None,
        )
        .unwrap();
        assert_eq!(map.position_of(CanonicalField::RegistrationNo), Some(0));
        assert_eq!(map.position_of(CanonicalField::ChassisNo), Some(1));
        assert_eq!(map.position_of(CanonicalField::CustomerName), Some(2));
        assert_eq!(map.position_of(CanonicalField::BankName), Some(3));
    }

    #[test]
    fn test_unmapped_column_becomes_extra() {
        let map = resolve_headers(&headers(&["Reg No", "Agent Remark"]), None).unwrap();
        assert_eq!(
            map.columns()[1].1,
            ColumnTarget::Extra("Agent Remark".to_string())
        );
    }

    #[test]
    fn test_first_column_wins_on_collision() {
        let map = resolve_headers(&headers(&["Vehicle No", "Reg No"]), None).unwrap();
        assert_eq!(map.position_of(CanonicalField::RegistrationNo), Some(0));
        assert_eq!(
            map.columns()[1].1,
            ColumnTarget::Extra("Reg No".to_string())
        );
    }

    #[test]
    fn test_missing_registration_column_is_schema_error() {
        let err = resolve_headers(&headers(&["Customer Name", "Bank"]), None).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[test]
    fn test_tenant_alias_overlay_wins() {
        let mut aliases = AliasMap::new();
        // This tenant's sheets use "File No" for the loan number.
        aliases.insert(CanonicalField::LoanNo, vec!["File No".to_string()]);
        let map = resolve_headers(&headers(&["Reg No", "File No"]), Some(&aliases)).unwrap();
        assert_eq!(map.position_of(CanonicalField::LoanNo), Some(1));
    }

    #[test]
    fn test_tenant_alias_can_rebind_builtin() {
        let mut aliases = AliasMap::new();
        // "Product" means the loan product here, not the vehicle model.
        aliases.insert(CanonicalField::LoanNo, vec!["Product".to_string()]);
        let map = resolve_headers(&headers(&["Reg No", "Product"]), Some(&aliases)).unwrap();
        assert_eq!(map.position_of(CanonicalField::LoanNo), Some(1));
        assert_eq!(map.position_of(CanonicalField::MakeModel), None);
    }

    #[test]
    fn test_blank_header_gets_positional_name() {
        let map = resolve_headers(&headers(&["Reg No", "", "Bank"]), None).unwrap();
        assert_eq!(
            map.columns()[1].1,
            ColumnTarget::Extra("column_2".to_string())
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let hs = headers(&["Reg No", "Chassis No", "Remark"]);
        let a = resolve_headers(&hs, None).unwrap().to_json();
        let b = resolve_headers(&hs, None).unwrap().to_json();
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_shape() {
        let map = resolve_headers(&headers(&["Reg No", "Remark"]), None).unwrap();
        let snapshot = map.to_json();
        assert_eq!(snapshot[0]["header"], "Reg No");
        assert_eq!(snapshot[0]["target"], "registration_no");
        assert!(snapshot[1]["target"].is_null());
    }
}
