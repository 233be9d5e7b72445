//! Transfer lifecycle status and the manual-approval gate.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rules::context::RuleSetPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Executed,
    PendingApproval,
    Rejected,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Executed => "executed",
            TransferStatus::PendingApproval => "pending_approval",
            TransferStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "executed" => Ok(TransferStatus::Executed),
            "pending_approval" => Ok(TransferStatus::PendingApproval),
            "rejected" => Ok(TransferStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown transfer status '{other}'"
            ))),
        }
    }
}

/// Whether a transfer that passed validation still needs a human sign-off.
///
/// A rule set may carry a unit threshold; transfers at or above it are
/// parked as `pending_approval` instead of executing immediately.
pub fn requires_manual_approval(rules: &RuleSetPolicy, units: i64) -> bool {
    match rules.approval_threshold_units {
        Some(threshold) => units >= threshold,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_threshold_never_requires_approval() {
        let rules = RuleSetPolicy::unrestricted();
        assert!(!requires_manual_approval(&rules, i64::MAX));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut rules = RuleSetPolicy::unrestricted();
        rules.approval_threshold_units = Some(1_000);
        assert!(!requires_manual_approval(&rules, 999));
        assert!(requires_manual_approval(&rules, 1_000));
        assert!(requires_manual_approval(&rules, 1_001));
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            TransferStatus::Executed,
            TransferStatus::PendingApproval,
            TransferStatus::Rejected,
        ] {
            assert_eq!(s.as_str().parse::<TransferStatus>().unwrap(), s);
        }
    }
}
