//! Loading database rows into the snapshot types the rule engine consumes.

use sqlx::PgPool;

use registra_core::eligibility::{CriteriaSnapshot, FundProfile};
use registra_core::error::CoreError;
use registra_core::investor::{InvestorType, KycStatus};
use registra_core::rules::composite::{CompositeRuleSpec, LogicalOperator, RuleSeverity};
use registra_core::rules::condition::RuleCondition;
use registra_core::rules::context::{
    AssetSnapshot, HoldingSnapshot, InvestorProfile, RuleSetPolicy, TransferRequest,
    ValidationContext,
};
use registra_core::types::DbId;
use registra_db::models::asset::Asset;
use registra_db::models::composite_rule::CompositeRule;
use registra_db::models::holding::Holding;
use registra_db::models::investor::Investor;
use registra_db::models::rule_set::RuleSet;
use registra_db::repositories::{
    AssetRepo, CompositeRuleRepo, EligibilityCriteriaRepo, FundStructureRepo, HoldingRepo,
    InvestorRepo, RuleSetRepo,
};

use crate::compliance::eligibility::{criteria_snapshot, fund_profile};
use crate::error::{AppError, AppResult};

/// Everything a transfer evaluation needs except the holdings, which the
/// caller loads separately (locked inside the execution transaction,
/// unlocked for validate/simulate).
#[derive(Debug, Clone)]
pub struct TransferBasis {
    pub request: TransferRequest,
    pub from_investor: InvestorProfile,
    pub to_investor: InvestorProfile,
    pub asset: AssetSnapshot,
    pub rules: RuleSetPolicy,
    /// Version of the active rule set, `None` when the asset has never
    /// had rules published (evaluated as unrestricted).
    pub rule_set_version: Option<i32>,
    pub composite_rules: Vec<CompositeRuleSpec>,
    pub holder_count: i64,
    /// Fund the asset belongs to, `None` for standalone assets.
    pub fund: Option<FundProfile>,
    /// Eligibility criteria applicable to the receiver under that fund.
    pub fund_criteria: Option<CriteriaSnapshot>,
}

impl TransferBasis {
    /// Assemble the full evaluation context once holdings are known.
    pub fn context(
        &self,
        from_holding: Option<HoldingSnapshot>,
        to_holding: Option<HoldingSnapshot>,
    ) -> ValidationContext {
        ValidationContext {
            transfer: self.request.clone(),
            from_investor: self.from_investor.clone(),
            to_investor: self.to_investor.clone(),
            from_holding,
            to_holding,
            asset: self.asset.clone(),
            rules: self.rules.clone(),
            holder_count: self.holder_count,
        }
    }
}

/// Load the consistent read set for one transfer request.
pub async fn load_transfer_basis(
    pool: &PgPool,
    tenant_id: &str,
    request: TransferRequest,
) -> AppResult<TransferBasis> {
    let asset = AssetRepo::find_by_id(pool, tenant_id, request.asset_id)
        .await?
        .ok_or_else(|| not_found("Asset", request.asset_id))?;

    let from_investor = InvestorRepo::find_by_id(pool, tenant_id, request.from_investor_id)
        .await?
        .ok_or_else(|| not_found("Investor", request.from_investor_id))?;

    let to_investor = InvestorRepo::find_by_id(pool, tenant_id, request.to_investor_id)
        .await?
        .ok_or_else(|| not_found("Investor", request.to_investor_id))?;

    let active = RuleSetRepo::find_active(pool, tenant_id, request.asset_id).await?;
    let rule_set_version = active.as_ref().map(|rs| rs.version);
    let rules = match &active {
        Some(rs) => rule_set_policy(rs)?,
        None => RuleSetPolicy::unrestricted(),
    };

    let composite_rows = CompositeRuleRepo::list_enabled(pool, tenant_id, request.asset_id).await?;
    let composite_rules = composite_rows
        .iter()
        .filter_map(|row| match composite_rule_spec(row) {
            Ok(spec) => Some(spec),
            Err(err) => {
                // Rules are validated at creation; a row failing to parse
                // here is corrupt and must not silently disable checks.
                tracing::error!(rule_id = row.id, %err, "Skipping unparseable composite rule");
                None
            }
        })
        .collect();

    let holder_count = HoldingRepo::count_holders(pool, tenant_id, request.asset_id).await?;

    let to_investor = investor_profile(&to_investor)?;

    // Fund state is part of the read set so fund-linked eligibility
    // runs against the same snapshot as the transfer checks.
    let (fund, fund_criteria) = match asset.fund_structure_id {
        Some(fund_structure_id) => {
            let fund_row = FundStructureRepo::find_by_id(pool, tenant_id, fund_structure_id)
                .await?
                .ok_or_else(|| not_found("Fund structure", fund_structure_id))?;
            let criteria_row = EligibilityCriteriaRepo::find_applicable(
                pool,
                tenant_id,
                fund_structure_id,
                &to_investor.jurisdiction,
                to_investor.investor_type.as_str(),
                chrono::Utc::now().date_naive(),
            )
            .await?;
            (
                Some(fund_profile(&fund_row)?),
                criteria_row.as_ref().map(criteria_snapshot).transpose()?,
            )
        }
        None => (None, None),
    };

    Ok(TransferBasis {
        request,
        from_investor: investor_profile(&from_investor)?,
        to_investor,
        asset: asset_snapshot(&asset),
        rules,
        rule_set_version,
        composite_rules,
        holder_count,
        fund,
        fund_criteria,
    })
}

/// Parse a stored investor row into the typed profile the evaluators use.
pub fn investor_profile(investor: &Investor) -> AppResult<InvestorProfile> {
    let investor_type: InvestorType = investor.investor_type.parse()?;
    let kyc_status: KycStatus = investor.kyc_status.parse()?;
    let classification_evidence: Vec<serde_json::Value> =
        serde_json::from_value(investor.classification_evidence.clone()).unwrap_or_default();
    Ok(InvestorProfile {
        id: investor.id,
        name: investor.name.clone(),
        jurisdiction: investor.jurisdiction.clone(),
        accredited: investor.accredited,
        investor_type,
        kyc_status,
        kyc_expiry: investor.kyc_expiry,
        classification_method: investor.classification_method.clone(),
        classification_date: investor.classification_date,
        classification_evidence,
    })
}

pub fn asset_snapshot(asset: &Asset) -> AssetSnapshot {
    AssetSnapshot {
        id: asset.id,
        name: asset.name.clone(),
        total_units: asset.total_units,
        unit_price_cents: Some(asset.unit_price_cents),
        fund_structure_id: asset.fund_structure_id,
    }
}

pub fn holding_snapshot(holding: &Holding) -> HoldingSnapshot {
    HoldingSnapshot {
        units: holding.units,
        acquired_at: holding.acquired_at,
    }
}

/// Decode a persisted rule set into the policy snapshot.
///
/// Whitelists are JSONB in the row; a minimum investment of zero means
/// no minimum.
pub fn rule_set_policy(rule_set: &RuleSet) -> AppResult<RuleSetPolicy> {
    let jurisdiction_whitelist: Vec<String> =
        serde_json::from_value(rule_set.jurisdiction_whitelist.clone())
            .map_err(|e| corrupt_rule_set(rule_set.id, "jurisdiction_whitelist", &e))?;

    let transfer_whitelist: Option<Vec<DbId>> = rule_set
        .transfer_whitelist
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| corrupt_rule_set(rule_set.id, "transfer_whitelist", &e))?;

    let investor_type_whitelist: Option<Vec<InvestorType>> = rule_set
        .investor_type_whitelist
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| corrupt_rule_set(rule_set.id, "investor_type_whitelist", &e))?;

    Ok(RuleSetPolicy {
        version: rule_set.version,
        qualification_required: rule_set.qualification_required,
        lockup_days: rule_set.lockup_days,
        jurisdiction_whitelist,
        transfer_whitelist,
        investor_type_whitelist,
        minimum_investment_cents: (rule_set.minimum_investment_cents > 0)
            .then_some(rule_set.minimum_investment_cents),
        maximum_investors: rule_set.maximum_investors,
        concentration_limit_pct: rule_set.concentration_limit_pct,
        kyc_required: rule_set.kyc_required,
        approval_threshold_units: rule_set.approval_threshold_units,
    })
}

/// Decode a persisted composite rule into its evaluation spec.
pub fn composite_rule_spec(rule: &CompositeRule) -> AppResult<CompositeRuleSpec> {
    let operator: LogicalOperator = rule.operator.parse()?;
    let conditions: Vec<RuleCondition> = serde_json::from_value(rule.conditions.clone())
        .map_err(|e| {
            AppError::InternalError(format!(
                "Composite rule {} has unparseable conditions: {e}",
                rule.id
            ))
        })?;
    let severity: RuleSeverity =
        serde_json::from_value(serde_json::Value::String(rule.severity.clone()))
            .unwrap_or_default();

    Ok(CompositeRuleSpec {
        name: rule.name.clone(),
        description: rule.description.clone(),
        operator,
        conditions,
        enabled: rule.enabled,
        severity,
        jurisdiction: rule.jurisdiction.clone(),
    })
}

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

fn corrupt_rule_set(id: DbId, field: &str, err: &serde_json::Error) -> AppError {
    AppError::InternalError(format!("Rule set {id} has unparseable {field}: {err}"))
}
