//! Onboarding workflow state machine.
//!
//! `applied -> eligible | ineligible`, `eligible -> approved | rejected`,
//! `approved -> allocated`. An application can also be rejected straight
//! from `applied`. `ineligible`, `rejected` and `allocated` are terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Applied,
    Eligible,
    Ineligible,
    Approved,
    Rejected,
    Allocated,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::Applied => "applied",
            OnboardingStatus::Eligible => "eligible",
            OnboardingStatus::Ineligible => "ineligible",
            OnboardingStatus::Approved => "approved",
            OnboardingStatus::Rejected => "rejected",
            OnboardingStatus::Allocated => "allocated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OnboardingStatus::Ineligible | OnboardingStatus::Rejected | OnboardingStatus::Allocated
        )
    }
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OnboardingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(OnboardingStatus::Applied),
            "eligible" => Ok(OnboardingStatus::Eligible),
            "ineligible" => Ok(OnboardingStatus::Ineligible),
            "approved" => Ok(OnboardingStatus::Approved),
            "rejected" => Ok(OnboardingStatus::Rejected),
            "allocated" => Ok(OnboardingStatus::Allocated),
            other => Err(CoreError::Validation(format!(
                "Unknown onboarding status '{other}'"
            ))),
        }
    }
}

/// Whether `from -> to` is a permitted workflow transition.
pub fn can_transition(from: OnboardingStatus, to: OnboardingStatus) -> bool {
    use OnboardingStatus::*;
    matches!(
        (from, to),
        (Applied, Eligible)
            | (Applied, Ineligible)
            | (Applied, Rejected)
            | (Eligible, Approved)
            | (Eligible, Rejected)
            | (Approved, Allocated)
    )
}

/// Guard form of [`can_transition`] for use at state-change sites.
pub fn ensure_transition(from: OnboardingStatus, to: OnboardingStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot transition onboarding from '{from}' to '{to}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::OnboardingStatus::*;
    use super::*;

    #[test]
    fn test_permitted_transitions() {
        assert!(can_transition(Applied, Eligible));
        assert!(can_transition(Applied, Ineligible));
        assert!(can_transition(Applied, Rejected));
        assert!(can_transition(Eligible, Approved));
        assert!(can_transition(Eligible, Rejected));
        assert!(can_transition(Approved, Allocated));
    }

    #[test]
    fn test_forbidden_transitions() {
        assert!(!can_transition(Applied, Approved));
        assert!(!can_transition(Applied, Allocated));
        assert!(!can_transition(Eligible, Allocated));
        assert!(!can_transition(Approved, Rejected));
        assert!(!can_transition(Eligible, Applied));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [Ineligible, Rejected, Allocated] {
            assert!(terminal.is_terminal());
            for to in [Applied, Eligible, Ineligible, Approved, Rejected, Allocated] {
                assert!(!can_transition(terminal, to));
            }
        }
    }

    #[test]
    fn test_ensure_transition_rejects_with_conflict() {
        assert_matches!(
            ensure_transition(Applied, Allocated),
            Err(CoreError::Conflict(_))
        );
        assert!(ensure_transition(Eligible, Approved).is_ok());
    }

    #[test]
    fn test_round_trip_strings() {
        for s in [Applied, Eligible, Ineligible, Approved, Rejected, Allocated] {
            assert_eq!(s.as_str().parse::<OnboardingStatus>().unwrap(), s);
        }
    }
}
