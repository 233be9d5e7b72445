//! Handler for eligibility checks.

use axum::extract::State;
use axum::Json;
use registra_core::types::DbId;
use registra_events::RegistryEvent;
use serde::Deserialize;
use serde_json::json;

use crate::compliance::eligibility::{check_eligibility, EligibilityOutcome};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /eligibility/check`.
#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub investor_id: DbId,
    pub fund_structure_id: DbId,
    /// Proposed amount in cents; the minimum-investment check is
    /// skipped when omitted.
    pub investment_amount_cents: Option<i64>,
}

/// POST /api/v1/eligibility/check
pub async fn check(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EligibilityRequest>,
) -> AppResult<Json<EligibilityOutcome>> {
    let outcome = check_eligibility(
        &state.pool,
        &user.tenant_id,
        user.user_id,
        input.investor_id,
        input.fund_structure_id,
        input.investment_amount_cents,
    )
    .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "eligibility.checked")
            .with_entity("investor", input.investor_id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "fund_structure_id": input.fund_structure_id,
                "eligible": outcome.eligible,
            })),
    );

    Ok(Json(outcome))
}
