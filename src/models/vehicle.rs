//! Vehicle domain models and DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Vehicle class enum. Each tenant owns one data partition per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    TwoWheeler,
    FourWheeler,
    Commercial,
}

/// Canonical partition order. Search results and dashboards list classes
/// in this order.
pub const VEHICLE_CLASSES: [VehicleClass; 3] = [
    VehicleClass::TwoWheeler,
    VehicleClass::FourWheeler,
    VehicleClass::Commercial,
];

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "two_wheeler",
            Self::FourWheeler => "four_wheeler",
            Self::Commercial => "commercial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "two_wheeler" => Some(Self::TwoWheeler),
            "four_wheeler" => Some(Self::FourWheeler),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Repossession status enum.
///
/// Every record enters as `Pending`. `Released` and `Cancelled` are terminal
/// and can only be left through a manager override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Pending,
    Hold,
    InYard,
    Released,
    Cancelled,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Hold => "hold",
            Self::InYard => "in_yard",
            Self::Released => "released",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "hold" => Some(Self::Hold),
            "in_yard" => Some(Self::InYard),
            "released" => Some(Self::Released),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transitions are allowed without an override.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Cancelled)
    }

    /// Transition legality. Self-transitions are never legal, `Pending` is
    /// never a target, and terminal states accept nothing.
    pub fn can_transition_to(&self, target: VehicleStatus) -> bool {
        if *self == target || target == Self::Pending {
            return false;
        }
        match self {
            Self::Pending | Self::Hold | Self::InYard => true,
            Self::Released | Self::Cancelled => false,
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vehicle summary for search results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleSummary {
    /// Record UUID.
    pub id: Uuid,
    /// Vehicle class (the partition the record lives in).
    pub vehicle_class: VehicleClass,
    /// Normalized registration number.
    pub registration_no: String,
    /// Chassis number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_no: Option<String>,
    /// Loan account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_no: Option<String>,
    /// Customer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Financier name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    /// Make and model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_model: Option<String>,
    /// Current repossession status.
    pub status: VehicleStatus,
}

/// Full vehicle record detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleDetail {
    /// Record UUID.
    pub id: Uuid,
    /// Vehicle class.
    pub vehicle_class: VehicleClass,
    /// Upload batch this record came from.
    pub batch_id: Uuid,
    /// Normalized registration number.
    pub registration_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Monthly EMI amount, as parsed from the source sheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emi_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Unmapped source columns, verbatim (original header -> cell value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<JsonValue>,
    /// Current repossession status.
    pub status: VehicleStatus,
    /// Yard name, set while the vehicle is in yard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_name: Option<String>,
    /// Yard location, set while the vehicle is in yard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_location: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Status transitions, oldest first.
    pub status_history: Vec<StatusEventResponse>,
}

/// One entry in a record's status history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusEventResponse {
    /// Status before the transition.
    pub from_status: VehicleStatus,
    /// Status after the transition.
    pub to_status: VehicleStatus,
    /// Name of the API key that performed the transition.
    pub actor: String,
    /// True when a terminal state was left through a manager override.
    pub via_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_location: Option<String>,
    /// Transition timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request to transition a record to a new status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status.
    pub status: VehicleStatus,
    /// Yard name; only meaningful when moving to `in_yard`.
    #[serde(default)]
    pub yard_name: Option<String>,
    /// Yard location; only meaningful when moving to `in_yard`.
    #[serde(default)]
    pub yard_location: Option<String>,
    /// Leave a terminal state. Manager role only; recorded in the history.
    #[serde(default, rename = "override")]
    pub via_override: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_round_trip() {
        for class in VEHICLE_CLASSES {
            assert_eq!(VehicleClass::parse(class.as_str()), Some(class));
        }
        assert_eq!(VehicleClass::parse("three_wheeler"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            VehicleStatus::Pending,
            VehicleStatus::Hold,
            VehicleStatus::InYard,
            VehicleStatus::Released,
            VehicleStatus::Cancelled,
        ] {
            assert_eq!(VehicleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VehicleStatus::parse("in yard"), None);
    }

    #[test]
    fn test_pending_reaches_every_other_status() {
        let from = VehicleStatus::Pending;
        assert!(from.can_transition_to(VehicleStatus::Hold));
        assert!(from.can_transition_to(VehicleStatus::InYard));
        assert!(from.can_transition_to(VehicleStatus::Released));
        assert!(from.can_transition_to(VehicleStatus::Cancelled));
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for from in [
            VehicleStatus::Pending,
            VehicleStatus::Hold,
            VehicleStatus::InYard,
            VehicleStatus::Released,
            VehicleStatus::Cancelled,
        ] {
            assert!(!from.can_transition_to(VehicleStatus::Pending));
        }
    }

    #[test]
    fn test_self_transitions_rejected() {
        assert!(!VehicleStatus::Hold.can_transition_to(VehicleStatus::Hold));
        assert!(!VehicleStatus::Released.can_transition_to(VehicleStatus::Released));
    }

    #[test]
    fn test_intermediate_states_are_open() {
        assert!(VehicleStatus::Hold.can_transition_to(VehicleStatus::InYard));
        assert!(VehicleStatus::Hold.can_transition_to(VehicleStatus::Released));
        assert!(VehicleStatus::InYard.can_transition_to(VehicleStatus::Hold));
        assert!(VehicleStatus::InYard.can_transition_to(VehicleStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        for from in [VehicleStatus::Released, VehicleStatus::Cancelled] {
            assert!(from.is_terminal());
            for to in [
                VehicleStatus::Hold,
                VehicleStatus::InYard,
                VehicleStatus::Released,
                VehicleStatus::Cancelled,
            ] {
                if from == to {
                    continue;
                }
                assert!(!from.can_transition_to(to), "{from} -> {to} must be closed");
            }
        }
    }
}
