//! Tenant domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of organization a tenant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrgType {
    /// Repossession agency working for multiple financiers.
    Agency,
    /// Bank running its own recovery desk.
    Bank,
    /// Non-banking financial company.
    Nbfc,
}

impl OrgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agency => "agency",
            Self::Bank => "bank",
            Self::Nbfc => "nbfc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agency" => Some(Self::Agency),
            "bank" => Some(Self::Bank),
            "nbfc" => Some(Self::Nbfc),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to create a tenant (platform admin only).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTenantRequest {
    /// Unique short name (lowercase slug, 3-64 chars).
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Organization type.
    pub org_type: OrgType,
    /// Display multiplier for dashboard aggregates (>= 1).
    #[serde(default)]
    pub data_multiplier: Option<i32>,
}

/// Partial tenant update (platform admin only). Absent fields are untouched.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTenantRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    /// New display multiplier (>= 1).
    #[serde(default)]
    pub data_multiplier: Option<i32>,
    /// Activate or deactivate the tenant.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Tenant representation in admin responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantResponse {
    /// Tenant UUID.
    pub id: Uuid,
    /// Unique short name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Organization type.
    pub org_type: OrgType,
    /// Display multiplier applied to dashboard aggregates.
    pub data_multiplier: i32,
    /// Inactive tenants fail partition resolution on every data path.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Request to register a client (financier) under a tenant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// Client name, unique within the tenant.
    pub name: String,
    /// Contact phone, free form.
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Client representation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientResponse {
    /// Client UUID.
    pub id: Uuid,
    /// Client name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
