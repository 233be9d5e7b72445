//! Eligibility criteria resolution and investor eligibility checks.
//!
//! Criteria are configured per (fund structure, jurisdiction, investor
//! type). Resolution prefers an exact jurisdiction match over the `'*'`
//! wildcard, restricted to rows already effective and not superseded,
//! with ties broken by the most recent effective date. The repository
//! mirrors the same ordering in SQL; [`select_applicable_criteria`] is
//! the reference implementation the tests pin down.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decision::DecisionCheck;
use crate::investor::{InvestorType, KycStatus};
use crate::rules::context::InvestorProfile;
use crate::types::{DbId, Timestamp};

/// Jurisdiction value that matches any jurisdiction, at lower priority
/// than an exact match.
pub const JURISDICTION_WILDCARD: &str = "*";

/// Lifecycle status of a fund structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundStatus {
    Active,
    Closing,
    Closed,
    Liquidating,
}

impl FundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundStatus::Active => "active",
            FundStatus::Closing => "closing",
            FundStatus::Closed => "closed",
            FundStatus::Liquidating => "liquidating",
        }
    }
}

impl std::fmt::Display for FundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FundStatus {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FundStatus::Active),
            "closing" => Ok(FundStatus::Closing),
            "closed" => Ok(FundStatus::Closed),
            "liquidating" => Ok(FundStatus::Liquidating),
            other => Err(crate::error::CoreError::Validation(format!(
                "Unknown fund status '{other}'"
            ))),
        }
    }
}

/// Fund structure facts relevant to eligibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundProfile {
    pub id: DbId,
    pub name: String,
    pub legal_form: String,
    pub domicile: String,
    pub status: FundStatus,
}

/// One eligibility criteria row, as a value snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaSnapshot {
    pub id: DbId,
    pub jurisdiction: String,
    pub investor_type: InvestorType,
    pub minimum_investment_cents: i64,
    pub maximum_allocation_pct: Option<f64>,
    pub documentation_required: Vec<String>,
    pub suitability_required: bool,
    pub source_reference: Option<String>,
    pub effective_date: NaiveDate,
    pub superseded_at: Option<NaiveDate>,
}

/// Result of running the eligibility checks.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluation {
    pub checks: Vec<DecisionCheck>,
    pub eligible: bool,
}

/// Resolve the applicable criteria from candidate rows.
///
/// Exact jurisdiction match beats the wildcard; within the same
/// specificity the most recent effective date wins. Rows not yet
/// effective or already superseded never match.
pub fn select_applicable_criteria<'a>(
    candidates: &'a [CriteriaSnapshot],
    jurisdiction: &str,
    investor_type: InvestorType,
    today: NaiveDate,
) -> Option<&'a CriteriaSnapshot> {
    candidates
        .iter()
        .filter(|c| c.investor_type == investor_type)
        .filter(|c| c.jurisdiction == jurisdiction || c.jurisdiction == JURISDICTION_WILDCARD)
        .filter(|c| c.effective_date <= today && c.superseded_at.is_none())
        .min_by_key(|c| {
            let specificity = if c.jurisdiction == jurisdiction { 0 } else { 1 };
            // Most recent effective date first within the same specificity.
            (specificity, std::cmp::Reverse(c.effective_date))
        })
}

/// Run the investor-level eligibility checks against a fund structure.
///
/// Checks, in order: fund accepting investors, investor type permitted
/// (resolved criteria exist), minimum investment (skipped when no amount
/// is supplied), suitability assessment flag, KYC verified, KYC not
/// expired. Eligible iff every emitted check passed.
pub fn run_eligibility_checks(
    investor: &InvestorProfile,
    fund: &FundProfile,
    criteria: Option<&CriteriaSnapshot>,
    investment_amount_cents: Option<i64>,
    now: Timestamp,
) -> EligibilityEvaluation {
    let mut checks = Vec::new();

    if fund.status == FundStatus::Active {
        checks.push(DecisionCheck::passed(
            "fund_status",
            format!("Fund is {}", fund.status),
        ));
    } else {
        checks.push(DecisionCheck::failed(
            "fund_status",
            format!("Fund is {}, not accepting new investors", fund.status),
        ));
        // A closed fund short-circuits: no further checks are meaningful.
        return EligibilityEvaluation {
            checks,
            eligible: false,
        };
    }

    match criteria {
        None => {
            checks.push(DecisionCheck::failed(
                "investor_type_eligible",
                format!(
                    "No eligibility criteria found for {} investors from {} in {} ({})",
                    investor.investor_type, investor.jurisdiction, fund.legal_form, fund.domicile
                ),
            ));
        }
        Some(criteria) => {
            let source = criteria.source_reference.as_deref().unwrap_or("fund rules");
            checks.push(DecisionCheck::passed(
                "investor_type_eligible",
                format!(
                    "{} investors are eligible for {} ({source})",
                    investor.investor_type, fund.legal_form
                ),
            ));

            if criteria.minimum_investment_cents > 0 {
                match investment_amount_cents {
                    // Amount not supplied: the check is skipped entirely.
                    None => {}
                    Some(amount) => {
                        let min = criteria.minimum_investment_cents;
                        if amount >= min {
                            checks.push(DecisionCheck::passed(
                                "minimum_investment",
                                format!(
                                    "Investment {} meets minimum {} ({source})",
                                    format_cents(amount),
                                    format_cents(min)
                                ),
                            ));
                        } else {
                            checks.push(DecisionCheck::failed(
                                "minimum_investment",
                                format!(
                                    "Investment {} is below minimum {} for {} investors ({source})",
                                    format_cents(amount),
                                    format_cents(min),
                                    investor.investor_type
                                ),
                            ));
                        }
                    }
                }
            } else {
                checks.push(DecisionCheck::passed(
                    "minimum_investment",
                    "No minimum investment required",
                ));
            }

            if criteria.suitability_required {
                checks.push(DecisionCheck::passed(
                    "suitability_required",
                    format!(
                        "Suitability assessment required for {} investors in {}",
                        investor.investor_type, fund.legal_form
                    ),
                ));
            }
        }
    }

    // Non-retail investors must have their classification evidenced. A
    // recorded method passes; nothing on file at all fails; evidence or
    // a date without a method emits no check.
    if investor.investor_type != InvestorType::Retail {
        if let Some(method) = &investor.classification_method {
            checks.push(DecisionCheck::passed(
                "classification_evidence",
                format!("Investor classification method: {method}"),
            ));
        } else if investor.classification_evidence.is_empty()
            && investor.classification_date.is_none()
        {
            checks.push(DecisionCheck::failed(
                "classification_evidence",
                format!(
                    "No classification evidence on file for {} investor. Evidence of \
                     investor classification is required under applicable regulation \
                     (MiFID II Annex II, Loi SIF Art 2).",
                    investor.investor_type
                ),
            ));
        }
    }

    let kyc_valid = investor.kyc_status == KycStatus::Verified;
    checks.push(if kyc_valid {
        DecisionCheck::passed("kyc_valid", "KYC verified")
    } else {
        DecisionCheck::failed(
            "kyc_valid",
            format!("KYC status is '{}', must be 'verified'", investor.kyc_status),
        )
    });

    if kyc_valid {
        if let Some(expiry) = investor.kyc_expiry {
            checks.push(if expiry > now {
                DecisionCheck::passed("kyc_not_expired", format!("KYC expires {}", expiry.date_naive()))
            } else {
                DecisionCheck::failed("kyc_not_expired", format!("KYC expired on {}", expiry.date_naive()))
            });
        }
    }

    let eligible = checks.iter().all(|c| c.passed);
    EligibilityEvaluation { checks, eligible }
}

/// Render integer cents as a whole-currency amount for messages.
fn format_cents(cents: i64) -> String {
    let whole = cents / 100;
    let frac = (cents % 100).abs();
    if frac == 0 {
        format!("{whole}")
    } else {
        format!("{whole}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn investor(investor_type: InvestorType, jurisdiction: &str) -> InvestorProfile {
        InvestorProfile {
            id: 1,
            name: "Test Investor".into(),
            jurisdiction: jurisdiction.into(),
            accredited: true,
            investor_type,
            kyc_status: KycStatus::Verified,
            kyc_expiry: None,
            classification_method: Some("per-se professional".into()),
            classification_date: None,
            classification_evidence: Vec::new(),
        }
    }

    fn fund(status: FundStatus) -> FundProfile {
        FundProfile {
            id: 7,
            name: "Alpha Fund".into(),
            legal_form: "RAIF".into(),
            domicile: "LU".into(),
            status,
        }
    }

    fn criteria(jurisdiction: &str, effective: NaiveDate) -> CriteriaSnapshot {
        CriteriaSnapshot {
            id: 1,
            jurisdiction: jurisdiction.into(),
            investor_type: InvestorType::Professional,
            minimum_investment_cents: 100_000_00,
            maximum_allocation_pct: None,
            documentation_required: Vec::new(),
            suitability_required: false,
            source_reference: Some("AIFMD Art 6".into()),
            effective_date: effective,
            superseded_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exact_jurisdiction_beats_wildcard() {
        let rows = vec![
            criteria(JURISDICTION_WILDCARD, date(2025, 1, 1)),
            criteria("DE", date(2024, 1, 1)),
        ];
        let chosen = select_applicable_criteria(
            &rows,
            "DE",
            InvestorType::Professional,
            date(2026, 1, 1),
        )
        .unwrap();
        assert_eq!(chosen.jurisdiction, "DE");
    }

    #[test]
    fn test_wildcard_fallback_when_no_exact_match() {
        let rows = vec![criteria(JURISDICTION_WILDCARD, date(2025, 1, 1))];
        let chosen = select_applicable_criteria(
            &rows,
            "FR",
            InvestorType::Professional,
            date(2026, 1, 1),
        )
        .unwrap();
        assert_eq!(chosen.jurisdiction, JURISDICTION_WILDCARD);
    }

    #[test]
    fn test_future_effective_date_excluded() {
        let rows = vec![criteria("DE", date(2027, 1, 1))];
        assert!(select_applicable_criteria(
            &rows,
            "DE",
            InvestorType::Professional,
            date(2026, 1, 1)
        )
        .is_none());
    }

    #[test]
    fn test_superseded_row_excluded() {
        let mut row = criteria("DE", date(2024, 1, 1));
        row.superseded_at = Some(date(2025, 6, 1));
        assert!(select_applicable_criteria(
            &[row],
            "DE",
            InvestorType::Professional,
            date(2026, 1, 1)
        )
        .is_none());
    }

    #[test]
    fn test_tie_broken_by_latest_effective_date() {
        let rows = vec![criteria("DE", date(2024, 1, 1)), criteria("DE", date(2025, 1, 1))];
        let chosen = select_applicable_criteria(
            &rows,
            "DE",
            InvestorType::Professional,
            date(2026, 1, 1),
        )
        .unwrap();
        assert_eq!(chosen.effective_date, date(2025, 1, 1));
    }

    #[test]
    fn test_investor_type_must_match() {
        let rows = vec![criteria("DE", date(2024, 1, 1))];
        assert!(select_applicable_criteria(
            &rows,
            "DE",
            InvestorType::Retail,
            date(2026, 1, 1)
        )
        .is_none());
    }

    #[test]
    fn test_minimum_investment_spec_scenario() {
        // Criteria minimum 100,000; professional DE investor offering 50,000.
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = criteria("DE", date(2024, 1, 1));
        let result = run_eligibility_checks(
            &investor(InvestorType::Professional, "DE"),
            &fund(FundStatus::Active),
            Some(&c),
            Some(50_000_00),
            now,
        );
        assert!(!result.eligible);
        let failed: Vec<_> = result.checks.iter().filter(|c| !c.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].rule, "minimum_investment");
    }

    #[test]
    fn test_minimum_investment_skipped_without_amount() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = criteria("DE", date(2024, 1, 1));
        let result = run_eligibility_checks(
            &investor(InvestorType::Professional, "DE"),
            &fund(FundStatus::Active),
            Some(&c),
            None,
            now,
        );
        assert!(result.eligible);
        assert!(!result.checks.iter().any(|c| c.rule == "minimum_investment"));
    }

    #[test]
    fn test_inactive_fund_short_circuits() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let result = run_eligibility_checks(
            &investor(InvestorType::Professional, "DE"),
            &fund(FundStatus::Closed),
            None,
            None,
            now,
        );
        assert!(!result.eligible);
        assert_eq!(result.checks.len(), 1);
        assert_eq!(result.checks[0].rule, "fund_status");
    }

    #[test]
    fn test_missing_criteria_fails_type_check() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let result = run_eligibility_checks(
            &investor(InvestorType::Retail, "FR"),
            &fund(FundStatus::Active),
            None,
            None,
            now,
        );
        assert!(!result.eligible);
        assert!(result
            .checks
            .iter()
            .any(|c| c.rule == "investor_type_eligible" && !c.passed));
    }

    #[test]
    fn test_unclassified_professional_fails_evidence_check() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = criteria("DE", date(2024, 1, 1));
        let mut inv = investor(InvestorType::Professional, "DE");
        inv.classification_method = None;
        let result = run_eligibility_checks(&inv, &fund(FundStatus::Active), Some(&c), None, now);
        assert!(!result.eligible);
        assert!(result
            .checks
            .iter()
            .any(|c| c.rule == "classification_evidence" && !c.passed));
    }

    #[test]
    fn test_classification_date_alone_suffices() {
        // No method recorded, but a classification date on file means the
        // evidence check is not emitted at all.
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = criteria("DE", date(2024, 1, 1));
        let mut inv = investor(InvestorType::Professional, "DE");
        inv.classification_method = None;
        inv.classification_date = Some(date(2025, 3, 1));
        let result = run_eligibility_checks(&inv, &fund(FundStatus::Active), Some(&c), None, now);
        assert!(result.eligible);
        assert!(!result
            .checks
            .iter()
            .any(|c| c.rule == "classification_evidence"));
    }

    #[test]
    fn test_retail_investor_skips_classification_check() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut c = criteria("DE", date(2024, 1, 1));
        c.investor_type = InvestorType::Retail;
        let mut inv = investor(InvestorType::Retail, "DE");
        inv.classification_method = None;
        let result = run_eligibility_checks(&inv, &fund(FundStatus::Active), Some(&c), None, now);
        assert!(result.eligible);
        assert!(!result
            .checks
            .iter()
            .any(|c| c.rule == "classification_evidence"));
    }

    #[test]
    fn test_expired_kyc_fails() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let c = criteria("DE", date(2024, 1, 1));
        let mut inv = investor(InvestorType::Professional, "DE");
        inv.kyc_expiry = Some(now - Duration::days(1));
        let result = run_eligibility_checks(&inv, &fund(FundStatus::Active), Some(&c), None, now);
        assert!(!result.eligible);
        assert!(result
            .checks
            .iter()
            .any(|c| c.rule == "kyc_not_expired" && !c.passed));
    }
}
