//! Status transition service.
//!
//! Validates the request against the caller's role and the yard-field
//! rules, then hands the checked command to `DbPool::transition_record`,
//! which owns FSM legality and concurrency. Responds with the full record
//! detail so clients see the post-transition state and history in one
//! round trip.

use uuid::Uuid;

use crate::db::DbPool;
use crate::db::partition::TenantScope;
use crate::db::vehicle_records::RecordTransition;
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedCaller, TransitionRequest, VehicleDetail, VehicleStatus};
use crate::services::search;

/// Apply one status transition on behalf of a caller.
pub async fn apply_transition(
    pool: &DbPool,
    scope: &TenantScope,
    caller: &AuthenticatedCaller,
    record_id: Uuid,
    request: TransitionRequest,
) -> AppResult<VehicleDetail> {
    if request.via_override && !caller.is_manager() {
        return Err(AppError::Forbidden(
            "Only managers may override a terminal status".to_string(),
        ));
    }

    let target = request.status;

    if target != VehicleStatus::InYard
        && (request.yard_name.is_some() || request.yard_location.is_some())
    {
        return Err(AppError::InvalidInput(
            "yard_name and yard_location are only accepted when moving to in_yard".to_string(),
        ));
    }

    // Yard fields follow the status: set on entry, cleared on exit.
    let (yard_name, yard_location) = if target == VehicleStatus::InYard {
        (clean(request.yard_name), clean(request.yard_location))
    } else {
        (None, None)
    };

    let record = pool
        .transition_record(
            scope,
            record_id,
            RecordTransition {
                target,
                yard_name,
                yard_location,
                actor: caller.name.clone(),
                allow_override: request.via_override && caller.is_manager(),
            },
        )
        .await?;

    let events = pool.get_status_history(record_id).await?;
    search::detail_from_parts(record, events)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_blank_values() {
        assert_eq!(clean(Some("  ".to_string())), None);
        assert_eq!(clean(None), None);
        assert_eq!(
            clean(Some(" Yard 7 ".to_string())),
            Some("Yard 7".to_string())
        );
    }
}
