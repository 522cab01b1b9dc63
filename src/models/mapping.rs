//! Field mapping models: canonical schema fields and per-tenant alias config.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The fixed canonical schema every uploaded sheet is mapped onto.
///
/// `RegistrationNo` is the only field a sheet must provide; everything else
/// is optional and unmapped columns are retained verbatim as extra fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    RegistrationNo,
    ChassisNo,
    EngineNo,
    LoanNo,
    CustomerName,
    BankName,
    MakeModel,
    Branch,
    EmiAmount,
    Address,
}

/// All canonical fields in template column order.
pub const CANONICAL_FIELDS: [CanonicalField; 10] = [
    CanonicalField::RegistrationNo,
    CanonicalField::ChassisNo,
    CanonicalField::EngineNo,
    CanonicalField::LoanNo,
    CanonicalField::CustomerName,
    CanonicalField::BankName,
    CanonicalField::MakeModel,
    CanonicalField::Branch,
    CanonicalField::EmiAmount,
    CanonicalField::Address,
];

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationNo => "registration_no",
            Self::ChassisNo => "chassis_no",
            Self::EngineNo => "engine_no",
            Self::LoanNo => "loan_no",
            Self::CustomerName => "customer_name",
            Self::BankName => "bank_name",
            Self::MakeModel => "make_model",
            Self::Branch => "branch",
            Self::EmiAmount => "emi_amount",
            Self::Address => "address",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registration_no" => Some(Self::RegistrationNo),
            "chassis_no" => Some(Self::ChassisNo),
            "engine_no" => Some(Self::EngineNo),
            "loan_no" => Some(Self::LoanNo),
            "customer_name" => Some(Self::CustomerName),
            "bank_name" => Some(Self::BankName),
            "make_model" => Some(Self::MakeModel),
            "branch" => Some(Self::Branch),
            "emi_amount" => Some(Self::EmiAmount),
            "address" => Some(Self::Address),
            _ => None,
        }
    }

    /// Header used for this field in downloadable templates.
    pub fn template_header(&self) -> &'static str {
        match self {
            Self::RegistrationNo => "Registration No",
            Self::ChassisNo => "Chassis No",
            Self::EngineNo => "Engine No",
            Self::LoanNo => "Loan No",
            Self::CustomerName => "Customer Name",
            Self::BankName => "Bank Name",
            Self::MakeModel => "Make Model",
            Self::Branch => "Branch",
            Self::EmiAmount => "EMI Amount",
            Self::Address => "Address",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-tenant alias overlay: canonical field -> accepted sheet headers.
///
/// A BTreeMap keeps the JSONB representation stable across writes.
pub type AliasMap = BTreeMap<CanonicalField, Vec<String>>;

/// Tenant alias configuration response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldMappingResponse {
    /// Tenant-defined aliases (overlaid on the built-in alias table).
    pub aliases: AliasMap,
    /// Last update timestamp; None when the tenant has never customized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request replacing the tenant's alias configuration.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateFieldMappingRequest {
    /// Full replacement alias map. An empty map clears all customization.
    pub aliases: AliasMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trip() {
        for field in CANONICAL_FIELDS {
            assert_eq!(CanonicalField::parse(field.as_str()), Some(field));
        }
        assert_eq!(CanonicalField::parse("regno"), None);
    }

    #[test]
    fn test_alias_map_serializes_with_snake_case_keys() {
        let mut aliases = AliasMap::new();
        aliases.insert(CanonicalField::RegistrationNo, vec!["Vehicle No".into()]);
        let json = serde_json::to_value(&aliases).unwrap();
        assert!(json.get("registration_no").is_some());
    }
}
