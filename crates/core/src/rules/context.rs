//! Snapshot types consumed by the rule evaluators.
//!
//! The API layer loads these from the repositories in one consistent read
//! and hands them to the pure evaluation functions. They also serialize
//! into the `input_snapshot` of decision records.

use serde::{Deserialize, Serialize};

use crate::investor::{InvestorType, KycStatus};
use crate::types::{DbId, Timestamp};

/// A proposed unit transfer, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub asset_id: DbId,
    pub from_investor_id: DbId,
    pub to_investor_id: DbId,
    pub units: i64,
    pub execution_date: Timestamp,
}

/// Investor facts relevant to rule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorProfile {
    pub id: DbId,
    pub name: String,
    pub jurisdiction: String,
    pub accredited: bool,
    pub investor_type: InvestorType,
    pub kyc_status: KycStatus,
    pub kyc_expiry: Option<Timestamp>,
    /// How a non-retail classification was established, when recorded.
    pub classification_method: Option<String>,
    pub classification_date: Option<chrono::NaiveDate>,
    /// Supporting classification documents, as stored on the investor.
    pub classification_evidence: Vec<serde_json::Value>,
}

/// An investor's current unit balance in the asset under transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub units: i64,
    pub acquired_at: Timestamp,
}

/// Asset aggregates needed by the concentration and cap checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub id: DbId,
    pub name: String,
    pub total_units: i64,
    pub unit_price_cents: Option<i64>,
    pub fund_structure_id: Option<DbId>,
}

/// The active rule-set version for the asset, as a value snapshot.
///
/// Whitelist fields follow the persisted JSON convention: an empty
/// jurisdiction whitelist means unrestricted; a `None` transfer whitelist
/// means unrestricted (an empty `Some` blocks everyone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetPolicy {
    pub version: i32,
    pub qualification_required: bool,
    pub lockup_days: i32,
    pub jurisdiction_whitelist: Vec<String>,
    pub transfer_whitelist: Option<Vec<DbId>>,
    pub investor_type_whitelist: Option<Vec<InvestorType>>,
    pub minimum_investment_cents: Option<i64>,
    pub maximum_investors: Option<i32>,
    pub concentration_limit_pct: Option<f64>,
    pub kyc_required: bool,
    pub approval_threshold_units: Option<i64>,
}

impl RuleSetPolicy {
    /// A policy with every restriction switched off (useful in tests and
    /// for assets that have never been configured).
    pub fn unrestricted() -> Self {
        Self {
            version: 1,
            qualification_required: false,
            lockup_days: 0,
            jurisdiction_whitelist: Vec::new(),
            transfer_whitelist: None,
            investor_type_whitelist: None,
            minimum_investment_cents: None,
            maximum_investors: None,
            concentration_limit_pct: None,
            kyc_required: false,
            approval_threshold_units: None,
        }
    }
}

/// Everything the rule evaluators need to judge one transfer.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationContext {
    pub transfer: TransferRequest,
    pub from_investor: InvestorProfile,
    pub to_investor: InvestorProfile,
    pub from_holding: Option<HoldingSnapshot>,
    pub to_holding: Option<HoldingSnapshot>,
    pub asset: AssetSnapshot,
    pub rules: RuleSetPolicy,
    /// Number of distinct investors currently holding units of the asset.
    pub holder_count: i64,
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared context fixtures for the rule evaluator tests.

    use chrono::TimeZone;

    use super::*;
    use crate::investor::{InvestorType, KycStatus};

    /// A permissive baseline: two accredited, verified US investors, sender
    /// holds 1000 units acquired well outside any lockup, no restrictions.
    pub fn base_context() -> ValidationContext {
        let acquired = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let execution = chrono::Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        ValidationContext {
            transfer: TransferRequest {
                asset_id: 1,
                from_investor_id: 10,
                to_investor_id: 20,
                units: 100,
                execution_date: execution,
            },
            from_investor: InvestorProfile {
                id: 10,
                name: "Alice Capital".into(),
                jurisdiction: "US".into(),
                accredited: true,
                investor_type: InvestorType::Professional,
                kyc_status: KycStatus::Verified,
                kyc_expiry: None,
                classification_method: Some("per-se professional".into()),
                classification_date: None,
                classification_evidence: Vec::new(),
            },
            to_investor: InvestorProfile {
                id: 20,
                name: "Bob Holdings".into(),
                jurisdiction: "US".into(),
                accredited: true,
                investor_type: InvestorType::Professional,
                kyc_status: KycStatus::Verified,
                kyc_expiry: None,
                classification_method: Some("per-se professional".into()),
                classification_date: None,
                classification_evidence: Vec::new(),
            },
            from_holding: Some(HoldingSnapshot {
                units: 1000,
                acquired_at: acquired,
            }),
            to_holding: None,
            asset: AssetSnapshot {
                id: 1,
                name: "Fund I Class A".into(),
                total_units: 10_000,
                unit_price_cents: Some(100_00),
                fund_structure_id: None,
            },
            rules: RuleSetPolicy::unrestricted(),
            holder_count: 3,
        }
    }
}
