//! Decision record building blocks.
//!
//! Every compliance decision, pass or fail, real or simulated, is
//! captured as an immutable record. This module defines the shared check
//! shape, derives aggregate results, and computes the tamper-evidence
//! hash chain linking consecutive records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// What kind of decision was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    EligibilityCheck,
    TransferValidation,
    OnboardingReview,
}

impl DecisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::EligibilityCheck => "eligibility_check",
            DecisionType::TransferValidation => "transfer_validation",
            DecisionType::OnboardingReview => "onboarding_review",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eligibility_check" => Ok(DecisionType::EligibilityCheck),
            "transfer_validation" => Ok(DecisionType::TransferValidation),
            "onboarding_review" => Ok(DecisionType::OnboardingReview),
            other => Err(CoreError::Validation(format!(
                "Unknown decision type '{other}'"
            ))),
        }
    }
}

/// Outcome of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionResult {
    Approved,
    Rejected,
    /// A dry-run: the checks ran but nothing was mutated.
    Simulated,
}

impl DecisionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionResult::Approved => "approved",
            DecisionResult::Rejected => "rejected",
            DecisionResult::Simulated => "simulated",
        }
    }
}

impl fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionResult {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(DecisionResult::Approved),
            "rejected" => Ok(DecisionResult::Rejected),
            "simulated" => Ok(DecisionResult::Simulated),
            other => Err(CoreError::Validation(format!(
                "Unknown decision result '{other}'"
            ))),
        }
    }
}

/// One named check inside a decision, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCheck {
    pub rule: String,
    pub passed: bool,
    pub message: String,
}

impl DecisionCheck {
    pub fn passed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            passed: true,
            message: message.into(),
        }
    }

    pub fn failed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            passed: false,
            message: message.into(),
        }
    }
}

/// Structured `result_details` payload of a decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDetails {
    pub checks: Vec<DecisionCheck>,
    pub overall: DecisionResult,
    pub violation_count: usize,
}

/// Derive the aggregate result from a set of checks: all passed =
/// approved, any failure = rejected.
pub fn derive_result(checks: &[DecisionCheck]) -> DecisionResult {
    if checks.iter().all(|c| c.passed) {
        DecisionResult::Approved
    } else {
        DecisionResult::Rejected
    }
}

/// Build the `result_details` payload for an explicit result value.
///
/// Use [`derive_result`] first when the result follows from the checks;
/// pass `Simulated` (or a manual review outcome) explicitly otherwise.
pub fn build_result_details(checks: Vec<DecisionCheck>, overall: DecisionResult) -> ResultDetails {
    let violation_count = checks.iter().filter(|c| !c.passed).count();
    ResultDetails {
        checks,
        overall,
        violation_count,
    }
}

// ---------------------------------------------------------------------------
// Integrity hash chain
// ---------------------------------------------------------------------------

/// Known seed value for the first record in a tenant's hash chain.
const CHAIN_SEED: &str = "DECISION_CHAIN_SEED_V1";

/// Compute the SHA-256 integrity hash for a decision record.
///
/// `prev_hash` is the `integrity_hash` of the previous record in the
/// chain, or `None` for the first record. `entry_data` is the canonical
/// JSON of the record's content fields.
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let mut hasher = Sha256::new();
    hasher.update(format!("{prev}|{entry_data}").as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Canonical string a record's integrity hash is computed over.
///
/// Takes the stored string/JSON forms so append and verification hash
/// exactly what the database row contains. `serde_json::Value` maps
/// serialize with sorted keys, so the representation is stable.
pub fn canonical_entry_data(
    decision_type: &str,
    subject_id: i64,
    result: &str,
    input_snapshot: &serde_json::Value,
    rule_version_snapshot: &serde_json::Value,
    result_details: &serde_json::Value,
) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}",
        decision_type,
        subject_id,
        result,
        serde_json::to_string(input_snapshot).unwrap_or_default(),
        serde_json::to_string(rule_version_snapshot).unwrap_or_default(),
        serde_json::to_string(result_details).unwrap_or_default()
    )
}
