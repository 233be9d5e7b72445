//! Built-in structural transfer checks.
//!
//! Fixed, ordered rule set evaluated against every transfer regardless of
//! operator configuration. Each check emits a [`DecisionCheck`] whether it
//! passes or fails; the aggregate is the logical AND of all outcomes.
//! Composite rules are appended after the built-ins so one call yields the
//! complete check list for the decision record.

use crate::decision::DecisionCheck;
use crate::error::CoreError;
use crate::rules::composite::{evaluate_composite_rule, CompositeRuleSpec};
use crate::rules::context::ValidationContext;

/// Outcome of validating one transfer against all rules.
#[derive(Debug, Clone)]
pub struct TransferValidation {
    pub checks: Vec<DecisionCheck>,
    pub valid: bool,
}

impl TransferValidation {
    /// Messages of the failing checks, in evaluation order.
    pub fn violations(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.message.clone())
            .collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!("{passed}/{} checks passed", self.checks.len())
    }
}

/// Reject malformed requests before any rule evaluation runs.
///
/// These are input errors, not rule violations: no decision record is
/// written for them.
pub fn validate_request(ctx: &ValidationContext) -> Result<(), CoreError> {
    if ctx.transfer.units <= 0 {
        return Err(CoreError::Validation(
            "Transfer units must be greater than zero".into(),
        ));
    }
    if ctx.transfer.from_investor_id == ctx.transfer.to_investor_id {
        return Err(CoreError::Validation(
            "Cannot transfer units to the sending investor".into(),
        ));
    }
    Ok(())
}

/// Run the built-in rule set plus the supplied composite rules.
///
/// Callers must run [`validate_request`] first.
pub fn validate_transfer(
    ctx: &ValidationContext,
    composite_rules: &[CompositeRuleSpec],
) -> TransferValidation {
    let mut checks = vec![
        check_qualification(ctx),
        check_lockup(ctx),
        check_jurisdiction(ctx),
        check_transfer_whitelist(ctx),
        check_sufficient_balance(ctx),
        check_investor_type(ctx),
        check_concentration(ctx),
        check_maximum_investors(ctx),
        check_kyc(ctx),
    ];

    checks.extend(
        composite_rules
            .iter()
            .filter_map(|rule| evaluate_composite_rule(rule, ctx)),
    );

    let valid = checks.iter().all(|c| c.passed);
    TransferValidation { checks, valid }
}

/// Rule 1: both parties must be accredited when qualification is required.
fn check_qualification(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "qualification";
    if !ctx.rules.qualification_required {
        return DecisionCheck::passed(RULE, "Qualification not required");
    }
    if !ctx.to_investor.accredited {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Recipient investor \"{}\" is not accredited. Qualified investors only.",
                ctx.to_investor.name
            ),
        );
    }
    if !ctx.from_investor.accredited {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Sending investor \"{}\" is not accredited. Qualified investors only.",
                ctx.from_investor.name
            ),
        );
    }
    DecisionCheck::passed(RULE, "Both investors are accredited")
}

/// Rule 2: units must have been held for at least `lockup_days`.
fn check_lockup(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "lockup";
    if ctx.rules.lockup_days == 0 {
        return DecisionCheck::passed(RULE, "No lockup period");
    }
    let Some(holding) = &ctx.from_holding else {
        return DecisionCheck::failed(RULE, "No holding found for sender");
    };

    let held_days = (ctx.transfer.execution_date - holding.acquired_at).num_days();
    let lockup = i64::from(ctx.rules.lockup_days);
    if held_days < lockup {
        let remaining = lockup - held_days;
        return DecisionCheck::failed(
            RULE,
            format!("Lockup period violation. {remaining} day(s) remaining ({lockup} day lockup)."),
        );
    }
    DecisionCheck::passed(
        RULE,
        format!("Held {held_days} day(s), lockup {lockup} day(s) satisfied"),
    )
}

/// Rule 3: receiver's jurisdiction must be whitelisted, unless the list
/// is empty (unrestricted).
fn check_jurisdiction(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "jurisdiction_whitelist";
    let whitelist = &ctx.rules.jurisdiction_whitelist;
    if whitelist.is_empty() {
        return DecisionCheck::passed(RULE, "No jurisdiction restrictions");
    }
    if !whitelist.contains(&ctx.to_investor.jurisdiction) {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Recipient jurisdiction \"{}\" not in whitelist: [{}]",
                ctx.to_investor.jurisdiction,
                whitelist.join(", ")
            ),
        );
    }
    DecisionCheck::passed(
        RULE,
        format!("Jurisdiction \"{}\" is whitelisted", ctx.to_investor.jurisdiction),
    )
}

/// Rule 4: receiver must be on the transfer whitelist, unless it is NULL
/// (unrestricted).
fn check_transfer_whitelist(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "transfer_whitelist";
    let Some(whitelist) = &ctx.rules.transfer_whitelist else {
        return DecisionCheck::passed(RULE, "Transfers unrestricted");
    };
    if !whitelist.contains(&ctx.to_investor.id) {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Recipient investor \"{}\" not in transfer whitelist.",
                ctx.to_investor.name
            ),
        );
    }
    DecisionCheck::passed(RULE, "Recipient is on the transfer whitelist")
}

/// Rule 5: sender must hold at least the transferred units.
fn check_sufficient_balance(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "sufficient_balance";
    let Some(holding) = &ctx.from_holding else {
        return DecisionCheck::failed(RULE, "Sender has no holding for this asset");
    };
    if holding.units < ctx.transfer.units {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Insufficient units. Sender has {}, trying to transfer {}.",
                holding.units, ctx.transfer.units
            ),
        );
    }
    DecisionCheck::passed(
        RULE,
        format!("Sender holds {} unit(s), transferring {}", holding.units, ctx.transfer.units),
    )
}

/// Rule 6: receiver's investor type must be permitted, if a type
/// whitelist is configured.
fn check_investor_type(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "investor_type_whitelist";
    let Some(whitelist) = &ctx.rules.investor_type_whitelist else {
        return DecisionCheck::passed(RULE, "No investor type restrictions");
    };
    if !whitelist.contains(&ctx.to_investor.investor_type) {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Recipient investor type \"{}\" not permitted for this asset",
                ctx.to_investor.investor_type
            ),
        );
    }
    DecisionCheck::passed(
        RULE,
        format!("Investor type \"{}\" is permitted", ctx.to_investor.investor_type),
    )
}

/// Rule 7: receiver's post-transfer share of total units must not exceed
/// the concentration limit.
fn check_concentration(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "concentration_limit";
    let Some(limit_pct) = ctx.rules.concentration_limit_pct else {
        return DecisionCheck::passed(RULE, "No concentration limit");
    };
    if ctx.asset.total_units <= 0 {
        return DecisionCheck::failed(RULE, "Asset has no issued units");
    }

    let current = ctx.to_holding.as_ref().map_or(0, |h| h.units);
    let post_transfer = current + ctx.transfer.units;
    let share_pct = (post_transfer as f64 / ctx.asset.total_units as f64) * 100.0;

    if share_pct > limit_pct {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Post-transfer concentration {share_pct:.2}% exceeds {limit_pct:.2}% limit ({post_transfer} of {} units)",
                ctx.asset.total_units
            ),
        );
    }
    DecisionCheck::passed(
        RULE,
        format!("Post-transfer concentration {share_pct:.2}% within {limit_pct:.2}% limit"),
    )
}

/// Rule 8: a transfer that would add a new holder beyond the investor cap
/// is blocked.
fn check_maximum_investors(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "maximum_investors";
    let Some(cap) = ctx.rules.maximum_investors else {
        return DecisionCheck::passed(RULE, "No investor cap");
    };
    let is_new_holder = ctx.to_holding.is_none();
    if is_new_holder && ctx.holder_count >= i64::from(cap) {
        return DecisionCheck::failed(
            RULE,
            format!("Asset already has {} investor(s); cap is {cap}", ctx.holder_count),
        );
    }
    DecisionCheck::passed(RULE, format!("Investor cap {cap} not exceeded"))
}

/// Rule 9: receiver must have verified, unexpired KYC if required.
fn check_kyc(ctx: &ValidationContext) -> DecisionCheck {
    const RULE: &str = "kyc_required";
    if !ctx.rules.kyc_required {
        return DecisionCheck::passed(RULE, "KYC not required");
    }
    if ctx.to_investor.kyc_status != crate::investor::KycStatus::Verified {
        return DecisionCheck::failed(
            RULE,
            format!(
                "Recipient KYC status is '{}', must be 'verified'",
                ctx.to_investor.kyc_status
            ),
        );
    }
    if let Some(expiry) = ctx.to_investor.kyc_expiry {
        if expiry <= ctx.transfer.execution_date {
            return DecisionCheck::failed(
                RULE,
                format!("Recipient KYC expired on {}", expiry.date_naive()),
            );
        }
    }
    DecisionCheck::passed(RULE, "Recipient KYC verified")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::investor::{InvestorType, KycStatus};
    use crate::rules::composite::{LogicalOperator, RuleSeverity};
    use crate::rules::condition::{ConditionOperator, RuleCondition};
    use crate::rules::context::test_support::base_context;
    use crate::rules::context::HoldingSnapshot;

    const BUILTIN_CHECK_COUNT: usize = 9;

    fn failing_rules(validation: &TransferValidation) -> Vec<&str> {
        validation
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.rule.as_str())
            .collect()
    }

    #[test]
    fn test_unrestricted_transfer_passes_all_checks() {
        let ctx = base_context();
        let result = validate_transfer(&ctx, &[]);
        assert!(result.valid);
        assert_eq!(result.checks.len(), BUILTIN_CHECK_COUNT);
        assert!(result.violations().is_empty());
        assert_eq!(result.summary(), "9/9 checks passed");
    }

    #[test]
    fn test_request_validation_rejects_non_positive_units() {
        let mut ctx = base_context();
        ctx.transfer.units = 0;
        assert!(validate_request(&ctx).is_err());
    }

    #[test]
    fn test_request_validation_rejects_self_transfer() {
        let mut ctx = base_context();
        ctx.transfer.to_investor_id = ctx.transfer.from_investor_id;
        assert!(validate_request(&ctx).is_err());
    }

    #[test]
    fn test_qualification_blocks_unaccredited_recipient() {
        let mut ctx = base_context();
        ctx.rules.qualification_required = true;
        ctx.to_investor.accredited = false;
        let result = validate_transfer(&ctx, &[]);
        assert!(!result.valid);
        assert_eq!(failing_rules(&result), vec!["qualification"]);
    }

    #[test]
    fn test_lockup_spec_scenario() {
        // RuleSet{qualification_required, lockup 30, whitelist [DE, LU]};
        // accredited DE sender, units acquired 10 days ago, LU receiver.
        let execution = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let mut ctx = base_context();
        ctx.rules.qualification_required = true;
        ctx.rules.lockup_days = 30;
        ctx.rules.jurisdiction_whitelist = vec!["DE".into(), "LU".into()];
        ctx.from_investor.jurisdiction = "DE".into();
        ctx.to_investor.jurisdiction = "LU".into();
        ctx.transfer.execution_date = execution;
        ctx.from_holding = Some(HoldingSnapshot {
            units: 1000,
            acquired_at: execution - Duration::days(10),
        });

        let result = validate_transfer(&ctx, &[]);
        assert!(!result.valid);
        assert_eq!(failing_rules(&result), vec!["lockup"]);
        assert!(result.violations()[0].contains("20 day(s) remaining"));
    }

    #[test]
    fn test_lockup_exact_boundary_passes() {
        let mut ctx = base_context();
        ctx.rules.lockup_days = 30;
        ctx.from_holding = Some(HoldingSnapshot {
            units: 1000,
            acquired_at: ctx.transfer.execution_date - Duration::days(30),
        });
        assert!(validate_transfer(&ctx, &[]).valid);
    }

    #[test]
    fn test_jurisdiction_whitelist_blocks_outsider() {
        let mut ctx = base_context();
        ctx.rules.jurisdiction_whitelist = vec!["DE".into(), "LU".into()];
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["jurisdiction_whitelist"]);
    }

    #[test]
    fn test_empty_jurisdiction_whitelist_is_unrestricted() {
        let mut ctx = base_context();
        ctx.rules.jurisdiction_whitelist = Vec::new();
        assert!(validate_transfer(&ctx, &[]).valid);
    }

    #[test]
    fn test_transfer_whitelist_blocks_unlisted_recipient() {
        let mut ctx = base_context();
        ctx.rules.transfer_whitelist = Some(vec![999]);
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["transfer_whitelist"]);

        ctx.rules.transfer_whitelist = Some(vec![ctx.to_investor.id]);
        assert!(validate_transfer(&ctx, &[]).valid);
    }

    #[test]
    fn test_insufficient_balance_blocks() {
        let mut ctx = base_context();
        ctx.transfer.units = 5000;
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["sufficient_balance"]);
    }

    #[test]
    fn test_missing_holding_fails_balance_check() {
        let mut ctx = base_context();
        ctx.from_holding = None;
        let result = validate_transfer(&ctx, &[]);
        assert!(failing_rules(&result).contains(&"sufficient_balance"));
    }

    #[test]
    fn test_investor_type_whitelist() {
        let mut ctx = base_context();
        ctx.rules.investor_type_whitelist =
            Some(vec![InvestorType::Institutional, InvestorType::Professional]);
        assert!(validate_transfer(&ctx, &[]).valid);

        ctx.to_investor.investor_type = InvestorType::Retail;
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["investor_type_whitelist"]);
    }

    #[test]
    fn test_concentration_limit_blocks_excess_share() {
        let mut ctx = base_context();
        ctx.rules.concentration_limit_pct = Some(10.0);
        ctx.asset.total_units = 1000;
        ctx.transfer.units = 150; // 15% > 10%
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["concentration_limit"]);
    }

    #[test]
    fn test_concentration_counts_existing_receiver_holding() {
        let mut ctx = base_context();
        ctx.rules.concentration_limit_pct = Some(10.0);
        ctx.asset.total_units = 1000;
        ctx.transfer.units = 60;
        ctx.to_holding = Some(HoldingSnapshot {
            units: 50,
            acquired_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        });
        // 50 + 60 = 110 of 1000 = 11% > 10%
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["concentration_limit"]);
    }

    #[test]
    fn test_maximum_investors_blocks_new_holder_past_cap() {
        let mut ctx = base_context();
        ctx.rules.maximum_investors = Some(3);
        ctx.holder_count = 3;
        ctx.to_holding = None;
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["maximum_investors"]);
    }

    #[test]
    fn test_maximum_investors_allows_existing_holder() {
        let mut ctx = base_context();
        ctx.rules.maximum_investors = Some(3);
        ctx.holder_count = 3;
        ctx.to_holding = Some(HoldingSnapshot {
            units: 10,
            acquired_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        });
        assert!(validate_transfer(&ctx, &[]).valid);
    }

    #[test]
    fn test_kyc_required_blocks_unverified_recipient() {
        let mut ctx = base_context();
        ctx.rules.kyc_required = true;
        ctx.to_investor.kyc_status = KycStatus::Pending;
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["kyc_required"]);
    }

    #[test]
    fn test_kyc_expiry_in_past_blocks() {
        let mut ctx = base_context();
        ctx.rules.kyc_required = true;
        ctx.to_investor.kyc_expiry = Some(ctx.transfer.execution_date - Duration::days(1));
        let result = validate_transfer(&ctx, &[]);
        assert_eq!(failing_rules(&result), vec!["kyc_required"]);
    }

    #[test]
    fn test_composite_rules_append_after_builtins() {
        let ctx = base_context();
        let rule = CompositeRuleSpec {
            name: "min transfer size".into(),
            description: "Transfers must be at least 500 units".into(),
            operator: LogicalOperator::And,
            conditions: vec![RuleCondition {
                field: "transfer.units".parse().unwrap(),
                operator: ConditionOperator::Gte,
                value: json!(500),
            }],
            enabled: true,
            severity: RuleSeverity::High,
            jurisdiction: None,
        };
        let result = validate_transfer(&ctx, &[rule]);
        assert!(!result.valid);
        assert_eq!(result.checks.len(), BUILTIN_CHECK_COUNT + 1);
        assert_eq!(failing_rules(&result), vec!["min transfer size"]);
    }

    #[test]
    fn test_every_check_emits_a_result_even_on_failure() {
        let mut ctx = base_context();
        ctx.rules.qualification_required = true;
        ctx.to_investor.accredited = false;
        ctx.transfer.units = 5000;
        let result = validate_transfer(&ctx, &[]);
        // Both failures are present; the rest still report passes.
        assert_eq!(result.checks.len(), BUILTIN_CHECK_COUNT);
        assert_eq!(
            failing_rules(&result),
            vec!["qualification", "sufficient_balance"]
        );
    }
}
