//! Investor classification and KYC lifecycle enums.
//!
//! Stored as lowercase snake_case strings in the database; the `Display`
//! and `FromStr` impls match that representation exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Five-tier investor classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorType {
    Institutional,
    Professional,
    SemiProfessional,
    WellInformed,
    Retail,
}

impl InvestorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorType::Institutional => "institutional",
            InvestorType::Professional => "professional",
            InvestorType::SemiProfessional => "semi_professional",
            InvestorType::WellInformed => "well_informed",
            InvestorType::Retail => "retail",
        }
    }
}

impl fmt::Display for InvestorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestorType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "institutional" => Ok(InvestorType::Institutional),
            "professional" => Ok(InvestorType::Professional),
            "semi_professional" => Ok(InvestorType::SemiProfessional),
            "well_informed" => Ok(InvestorType::WellInformed),
            "retail" => Ok(InvestorType::Retail),
            other => Err(CoreError::Validation(format!(
                "Unknown investor type '{other}'"
            ))),
        }
    }
}

/// KYC verification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Pending,
    Verified,
    Expired,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Verified => "verified",
            KycStatus::Expired => "expired",
            KycStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(KycStatus::Pending),
            "verified" => Ok(KycStatus::Verified),
            "expired" => Ok(KycStatus::Expired),
            "rejected" => Ok(KycStatus::Rejected),
            other => Err(CoreError::Validation(format!("Unknown KYC status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investor_type_round_trip() {
        for s in [
            "institutional",
            "professional",
            "semi_professional",
            "well_informed",
            "retail",
        ] {
            let parsed: InvestorType = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn test_unknown_investor_type_rejected() {
        assert!("vip".parse::<InvestorType>().is_err());
    }

    #[test]
    fn test_kyc_status_round_trip() {
        for s in ["pending", "verified", "expired", "rejected"] {
            let parsed: KycStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }
}
