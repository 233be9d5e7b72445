//! Building decision record rows from evaluation outcomes.

use registra_core::decision::{DecisionResult, DecisionType, ResultDetails};
use registra_core::types::DbId;
use registra_db::models::decision_record::CreateDecisionRecord;

use crate::error::{AppError, AppResult};

/// Subject type tag for investor-scoped decisions.
pub const SUBJECT_INVESTOR: &str = "investor";
/// Subject type tag for transfer-scoped decisions.
pub const SUBJECT_TRANSFER: &str = "transfer";
/// Subject type tag for onboarding-scoped decisions.
pub const SUBJECT_ONBOARDING: &str = "onboarding";

/// Assemble the insert payload for one decision record.
///
/// The chain fields (`sequence_number`, `previous_hash`,
/// `integrity_hash`) are computed by the repository at append time.
#[allow(clippy::too_many_arguments)]
pub fn build_decision_record(
    decision_type: DecisionType,
    subject_type: &str,
    subject_id: DbId,
    asset_id: Option<DbId>,
    rule_set_version: Option<i32>,
    input_snapshot: serde_json::Value,
    rule_version_snapshot: serde_json::Value,
    result: DecisionResult,
    details: &ResultDetails,
    evaluated_by: Option<DbId>,
) -> AppResult<CreateDecisionRecord> {
    let result_details = serde_json::to_value(details)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize decision details: {e}")))?;

    Ok(CreateDecisionRecord {
        decision_type: decision_type.as_str().to_string(),
        subject_type: subject_type.to_string(),
        subject_id,
        asset_id,
        rule_set_version,
        input_snapshot,
        rule_version_snapshot,
        result: result.as_str().to_string(),
        result_details,
        evaluated_by,
    })
}
