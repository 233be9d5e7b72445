//! Investor eligibility checks against a fund structure.

use chrono::Utc;
use sqlx::PgPool;

use registra_core::decision::{
    build_result_details, DecisionCheck, DecisionResult, DecisionType,
};
use registra_core::eligibility::{
    run_eligibility_checks, CriteriaSnapshot, FundProfile, FundStatus,
};
use registra_core::error::CoreError;
use registra_core::types::DbId;
use registra_db::models::eligibility_criteria::EligibilityCriteria;
use registra_db::models::fund_structure::FundStructure;
use registra_db::repositories::{
    DecisionRecordRepo, EligibilityCriteriaRepo, FundStructureRepo, InvestorRepo,
};
use serde::Serialize;

use crate::compliance::context::investor_profile;
use crate::compliance::recorder::{build_decision_record, SUBJECT_INVESTOR};
use crate::error::{AppError, AppResult};

/// Outcome of one eligibility check, as returned to clients.
#[derive(Debug, Serialize)]
pub struct EligibilityOutcome {
    pub eligible: bool,
    pub checks: Vec<DecisionCheck>,
    /// The criteria row that applied, if any resolved.
    pub criteria_id: Option<DbId>,
    pub decision_record_id: DbId,
}

/// Check whether an investor may invest in a fund structure, appending
/// a decision record with the result.
pub async fn check_eligibility(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    investor_id: DbId,
    fund_structure_id: DbId,
    investment_amount_cents: Option<i64>,
) -> AppResult<EligibilityOutcome> {
    let investor = InvestorRepo::find_by_id(pool, tenant_id, investor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id: investor_id,
        }))?;
    let profile = investor_profile(&investor)?;

    let fund_row = FundStructureRepo::find_by_id(pool, tenant_id, fund_structure_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund structure",
            id: fund_structure_id,
        }))?;
    let fund = fund_profile(&fund_row)?;

    let criteria_row = EligibilityCriteriaRepo::find_applicable(
        pool,
        tenant_id,
        fund_structure_id,
        &profile.jurisdiction,
        profile.investor_type.as_str(),
        Utc::now().date_naive(),
    )
    .await?;
    let criteria = criteria_row.as_ref().map(criteria_snapshot).transpose()?;

    let evaluation = run_eligibility_checks(
        &profile,
        &fund,
        criteria.as_ref(),
        investment_amount_cents,
        Utc::now(),
    );

    let result = if evaluation.eligible {
        DecisionResult::Approved
    } else {
        DecisionResult::Rejected
    };
    let details = build_result_details(evaluation.checks.clone(), result);

    let input_snapshot = serde_json::json!({
        "investor_id": profile.id,
        "investor_name": &profile.name,
        "investor_type": profile.investor_type,
        "investor_jurisdiction": &profile.jurisdiction,
        "kyc_status": profile.kyc_status,
        "fund_structure_id": fund.id,
        "fund_name": &fund.name,
        "fund_legal_form": &fund.legal_form,
        "fund_domicile": &fund.domicile,
        "investment_amount_cents": investment_amount_cents,
    });
    let rule_version_snapshot = serde_json::json!({
        "criteria": &criteria,
        "fund_status": fund.status,
    });

    let record_input = build_decision_record(
        DecisionType::EligibilityCheck,
        SUBJECT_INVESTOR,
        investor_id,
        None,
        None,
        input_snapshot,
        rule_version_snapshot,
        result,
        &details,
        Some(actor),
    )?;
    let mut tx = pool.begin().await?;
    let record = DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;
    tx.commit().await?;

    Ok(EligibilityOutcome {
        eligible: evaluation.eligible,
        checks: evaluation.checks,
        criteria_id: criteria.map(|c| c.id),
        decision_record_id: record.id,
    })
}

/// Parse a fund structure row into the evaluator's profile.
pub fn fund_profile(fund: &FundStructure) -> AppResult<FundProfile> {
    let status: FundStatus = fund.status.parse()?;
    Ok(FundProfile {
        id: fund.id,
        name: fund.name.clone(),
        legal_form: fund.legal_form.clone(),
        domicile: fund.domicile.clone(),
        status,
    })
}

/// Parse a criteria row into the evaluator's snapshot.
pub fn criteria_snapshot(row: &EligibilityCriteria) -> AppResult<CriteriaSnapshot> {
    let documentation_required: Vec<String> =
        serde_json::from_value(row.documentation_required.clone()).map_err(|e| {
            AppError::InternalError(format!(
                "Criteria {} has unparseable documentation_required: {e}",
                row.id
            ))
        })?;
    Ok(CriteriaSnapshot {
        id: row.id,
        jurisdiction: row.jurisdiction.clone(),
        investor_type: row.investor_type.parse()?,
        minimum_investment_cents: row.minimum_investment_cents,
        maximum_allocation_pct: row.maximum_allocation_pct,
        documentation_required,
        suitability_required: row.suitability_required,
        source_reference: row.source_reference.clone(),
        effective_date: row.effective_date,
        superseded_at: row.superseded_at,
    })
}
