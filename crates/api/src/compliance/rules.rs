//! Rule-set publishing and composite rule authoring, with validation
//! against the rule engine before anything is persisted.

use sqlx::PgPool;

use registra_core::error::CoreError;
use registra_core::investor::InvestorType;
use registra_core::rules::composite::{CompositeRuleSpec, LogicalOperator, RuleSeverity};
use registra_core::rules::condition::RuleCondition;
use registra_core::types::DbId;
use registra_db::models::composite_rule::{
    CompositeRule, CreateCompositeRule, UpdateCompositeRule,
};
use registra_db::models::rule_set::{CreateRuleSet, RuleSet};
use registra_db::repositories::{AssetRepo, CompositeRuleRepo, RuleSetRepo};

use crate::error::{AppError, AppResult};

/// Publish a new rule-set version for an asset, superseding the current
/// active version.
pub async fn publish_rule_set(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    asset_id: DbId,
    input: &CreateRuleSet,
) -> AppResult<RuleSet> {
    ensure_asset(pool, tenant_id, asset_id).await?;
    validate_rule_set(input)?;
    Ok(RuleSetRepo::publish(pool, tenant_id, asset_id, input, Some(actor)).await?)
}

/// Create a composite rule after validating it against the engine's
/// field and operator registry.
pub async fn create_composite_rule(
    pool: &PgPool,
    tenant_id: &str,
    asset_id: DbId,
    input: &CreateCompositeRule,
) -> AppResult<CompositeRule> {
    ensure_asset(pool, tenant_id, asset_id).await?;

    let spec = parse_spec(
        &input.name,
        &input.description,
        &input.operator,
        &input.conditions,
        input.enabled,
        input.severity.as_deref(),
        input.jurisdiction.clone(),
    )?;
    spec.validate()?;

    Ok(CompositeRuleRepo::create(pool, tenant_id, asset_id, input).await?)
}

/// Update a composite rule; the merged result must still be a valid rule.
pub async fn update_composite_rule(
    pool: &PgPool,
    tenant_id: &str,
    rule_id: DbId,
    input: &UpdateCompositeRule,
) -> AppResult<CompositeRule> {
    let existing = CompositeRuleRepo::find_by_id(pool, tenant_id, rule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Composite rule",
            id: rule_id,
        }))?;

    let spec = parse_spec(
        input.name.as_deref().unwrap_or(&existing.name),
        input.description.as_deref().unwrap_or(&existing.description),
        input.operator.as_deref().unwrap_or(&existing.operator),
        input.conditions.as_ref().unwrap_or(&existing.conditions),
        input.enabled.unwrap_or(existing.enabled),
        Some(input.severity.as_deref().unwrap_or(&existing.severity)),
        input
            .jurisdiction
            .clone()
            .or_else(|| existing.jurisdiction.clone()),
    )?;
    spec.validate()?;

    let updated = CompositeRuleRepo::update(pool, tenant_id, rule_id, input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Composite rule",
            id: rule_id,
        }))?;
    Ok(updated)
}

/// Structural validation of a rule-set policy before publishing.
fn validate_rule_set(input: &CreateRuleSet) -> AppResult<()> {
    if input.lockup_days < 0 {
        return Err(validation("lockup_days must not be negative"));
    }
    if input.minimum_investment_cents < 0 {
        return Err(validation("minimum_investment_cents must not be negative"));
    }
    if let Some(max) = input.maximum_investors {
        if max <= 0 {
            return Err(validation("maximum_investors must be greater than zero"));
        }
    }
    if let Some(pct) = input.concentration_limit_pct {
        if !(0.0..=100.0).contains(&pct) || pct == 0.0 {
            return Err(validation(
                "concentration_limit_pct must be between 0 (exclusive) and 100",
            ));
        }
    }
    if let Some(threshold) = input.approval_threshold_units {
        if threshold <= 0 {
            return Err(validation(
                "approval_threshold_units must be greater than zero",
            ));
        }
    }
    if let Some(types) = &input.investor_type_whitelist {
        for t in types {
            t.parse::<InvestorType>()?;
        }
    }
    Ok(())
}

/// Assemble and type-check a composite rule spec from its stored parts.
///
/// Unknown condition fields and operators surface as validation errors
/// naming the offending value.
fn parse_spec(
    name: &str,
    description: &str,
    operator: &str,
    conditions: &serde_json::Value,
    enabled: bool,
    severity: Option<&str>,
    jurisdiction: Option<String>,
) -> AppResult<CompositeRuleSpec> {
    let operator: LogicalOperator = operator.parse()?;

    let conditions: Vec<RuleCondition> = serde_json::from_value(conditions.clone())
        .map_err(|e| validation(&format!("Invalid rule conditions: {e}")))?;

    let severity: RuleSeverity = match severity {
        None => RuleSeverity::default(),
        Some(s) => serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| {
                validation(&format!(
                    "Unknown severity '{s}'. Must be low, medium, high, or critical"
                ))
            })?,
    };

    Ok(CompositeRuleSpec {
        name: name.to_string(),
        description: description.to_string(),
        operator,
        conditions,
        enabled,
        severity,
        jurisdiction,
    })
}

async fn ensure_asset(pool: &PgPool, tenant_id: &str, asset_id: DbId) -> AppResult<()> {
    AssetRepo::find_by_id(pool, tenant_id, asset_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        }))?;
    Ok(())
}

fn validation(msg: &str) -> AppError {
    AppError::Core(CoreError::Validation(msg.to_string()))
}
