//! Decision record entity model (append-only, hash-chained).
//!
//! Decision records are immutable once written: no update DTO exists
//! and the table carries no `updated_at`. Each row extends a per-tenant
//! hash chain (`sequence_number`, `previous_hash`, `integrity_hash`)
//! so that tampering with any historical record is detectable.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `decision_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DecisionRecord {
    pub id: DbId,
    pub tenant_id: String,
    pub decision_type: String,
    pub subject_type: String,
    pub subject_id: DbId,
    pub asset_id: Option<DbId>,
    pub rule_set_version: Option<i32>,
    /// Facts the decision was made over, as loaded at evaluation time.
    pub input_snapshot: serde_json::Value,
    /// Rule, criteria and version state in force when the decision ran.
    pub rule_version_snapshot: serde_json::Value,
    pub result: String,
    pub result_details: serde_json::Value,
    pub evaluated_by: Option<DbId>,
    pub sequence_number: i64,
    pub previous_hash: Option<String>,
    pub integrity_hash: String,
    pub created_at: Timestamp,
}

/// DTO for appending a decision record.
///
/// `sequence_number`, `previous_hash` and `integrity_hash` are computed
/// by the recorder, not supplied by callers.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDecisionRecord {
    pub decision_type: String,
    pub subject_type: String,
    pub subject_id: DbId,
    pub asset_id: Option<DbId>,
    pub rule_set_version: Option<i32>,
    pub input_snapshot: serde_json::Value,
    pub rule_version_snapshot: serde_json::Value,
    pub result: String,
    pub result_details: serde_json::Value,
    pub evaluated_by: Option<DbId>,
}

/// Result of verifying a tenant's decision record chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainVerification {
    pub verified_records: i64,
    pub chain_valid: bool,
    /// ID of the first record where the chain breaks, if any.
    pub first_break: Option<DbId>,
}
