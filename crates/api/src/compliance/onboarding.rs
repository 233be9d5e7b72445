//! Onboarding workflow: application, eligibility review, approval and
//! allocation.
//!
//! Status changes follow the state machine in
//! `registra_core::onboarding`; the repository's guarded UPDATE makes
//! concurrent transitions lose cleanly instead of double-writing.

use chrono::Utc;
use sqlx::PgPool;

use registra_core::decision::{
    build_result_details, DecisionCheck, DecisionResult, DecisionType,
};
use registra_core::error::CoreError;
use registra_core::onboarding::{ensure_transition, OnboardingStatus};
use registra_core::types::DbId;
use registra_db::models::onboarding::{CreateOnboarding, OnboardingRecord};
use registra_db::repositories::{
    DecisionRecordRepo, FundStructureRepo, HoldingRepo, InvestorRepo, OnboardingRepo,
};
use serde::Serialize;

use crate::compliance::eligibility::{check_eligibility, EligibilityOutcome};
use crate::compliance::recorder::{build_decision_record, SUBJECT_ONBOARDING};
use crate::error::{AppError, AppResult};

/// An onboarding record together with the eligibility evaluation that
/// moved it.
#[derive(Debug, Serialize)]
pub struct OnboardingReview {
    pub record: OnboardingRecord,
    pub evaluation: EligibilityOutcome,
}

/// Submit a new application in the `applied` state.
pub async fn apply(
    pool: &PgPool,
    tenant_id: &str,
    input: &CreateOnboarding,
) -> AppResult<OnboardingRecord> {
    // Surface missing references as 404s rather than FK errors.
    InvestorRepo::find_by_id(pool, tenant_id, input.investor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id: input.investor_id,
        }))?;
    FundStructureRepo::find_by_id(pool, tenant_id, input.fund_structure_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund structure",
            id: input.fund_structure_id,
        }))?;

    Ok(OnboardingRepo::create(pool, tenant_id, input).await?)
}

/// Run the eligibility checks for an applied application, moving it to
/// `eligible` or `ineligible`.
pub async fn review_eligibility(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    onboarding_id: DbId,
) -> AppResult<OnboardingReview> {
    let record = load(pool, tenant_id, onboarding_id).await?;
    let current: OnboardingStatus = record.status.parse()?;
    // Both review outcomes are legal from the same predecessor states,
    // so guard before evaluating. A conflicting call must not leave an
    // eligibility decision record behind.
    ensure_transition(current, OnboardingStatus::Eligible)?;

    let evaluation = check_eligibility(
        pool,
        tenant_id,
        actor,
        record.investor_id,
        record.fund_structure_id,
        record.investment_amount_cents,
    )
    .await?;

    let next = if evaluation.eligible {
        OnboardingStatus::Eligible
    } else {
        OnboardingStatus::Ineligible
    };

    let mut conn = pool.acquire().await?;
    let updated = OnboardingRepo::transition(
        &mut conn,
        tenant_id,
        onboarding_id,
        current.as_str(),
        next.as_str(),
        Some(actor),
        Some(evaluation.decision_record_id),
        None,
    )
    .await?
    .ok_or_else(|| transition_lost(onboarding_id))?;

    Ok(OnboardingReview {
        record: updated,
        evaluation,
    })
}

/// Approve an eligible application.
pub async fn approve(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    onboarding_id: DbId,
    notes: Option<&str>,
) -> AppResult<OnboardingRecord> {
    decide(
        pool,
        tenant_id,
        actor,
        onboarding_id,
        OnboardingStatus::Approved,
        notes,
    )
    .await
}

/// Reject an application from any non-terminal state.
pub async fn reject(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    onboarding_id: DbId,
    notes: Option<&str>,
) -> AppResult<OnboardingRecord> {
    decide(
        pool,
        tenant_id,
        actor,
        onboarding_id,
        OnboardingStatus::Rejected,
        notes,
    )
    .await
}

/// Allocate units to an approved application, creating the holding and
/// closing the workflow in one transaction.
pub async fn allocate(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    onboarding_id: DbId,
    units: i64,
) -> AppResult<OnboardingRecord> {
    if units <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Allocation units must be greater than zero".into(),
        )));
    }

    let record = load(pool, tenant_id, onboarding_id).await?;
    let current: OnboardingStatus = record.status.parse()?;
    ensure_transition(current, OnboardingStatus::Allocated)?;

    let asset_id = record.asset_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Application has no target asset to allocate into".into(),
        ))
    })?;

    let mut tx = pool.begin().await?;

    HoldingRepo::credit_locked(
        &mut tx,
        tenant_id,
        asset_id,
        record.investor_id,
        units,
        Utc::now(),
    )
    .await?;

    let check = DecisionCheck::passed(
        "allocation",
        format!("Allocated {units} units of asset {asset_id}"),
    );
    let details = build_result_details(vec![check], DecisionResult::Approved);
    let record_input = build_decision_record(
        DecisionType::OnboardingReview,
        SUBJECT_ONBOARDING,
        onboarding_id,
        Some(asset_id),
        None,
        serde_json::json!({
            "onboarding_id": onboarding_id,
            "investor_id": record.investor_id,
            "asset_id": asset_id,
            "units": units,
        }),
        serde_json::json!({}),
        DecisionResult::Approved,
        &details,
        Some(actor),
    )?;
    let decision = DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;

    let updated = OnboardingRepo::transition(
        &mut tx,
        tenant_id,
        onboarding_id,
        current.as_str(),
        OnboardingStatus::Allocated.as_str(),
        Some(actor),
        Some(decision.id),
        None,
    )
    .await?
    .ok_or_else(|| transition_lost(onboarding_id))?;

    tx.commit().await?;
    Ok(updated)
}

/// Shared manual-review transition: approve or reject, with a decision
/// record documenting the reviewer's call.
async fn decide(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    onboarding_id: DbId,
    next: OnboardingStatus,
    notes: Option<&str>,
) -> AppResult<OnboardingRecord> {
    let record = load(pool, tenant_id, onboarding_id).await?;
    let current: OnboardingStatus = record.status.parse()?;
    ensure_transition(current, next)?;

    let (result, check) = match next {
        OnboardingStatus::Approved => (
            DecisionResult::Approved,
            DecisionCheck::passed(
                "manual_review",
                notes.unwrap_or("Approved by compliance review"),
            ),
        ),
        _ => (
            DecisionResult::Rejected,
            DecisionCheck::failed(
                "manual_review",
                notes.unwrap_or("Rejected by compliance review"),
            ),
        ),
    };
    let details = build_result_details(vec![check], result);
    let record_input = build_decision_record(
        DecisionType::OnboardingReview,
        SUBJECT_ONBOARDING,
        onboarding_id,
        record.asset_id,
        None,
        serde_json::json!({
            "onboarding_id": onboarding_id,
            "investor_id": record.investor_id,
            "fund_structure_id": record.fund_structure_id,
            "asset_id": record.asset_id,
            "previous_status": current.as_str(),
        }),
        serde_json::json!({}),
        result,
        &details,
        Some(actor),
    )?;

    let mut tx = pool.begin().await?;
    let decision = DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;
    let updated = OnboardingRepo::transition(
        &mut tx,
        tenant_id,
        onboarding_id,
        current.as_str(),
        next.as_str(),
        Some(actor),
        Some(decision.id),
        notes,
    )
    .await?
    .ok_or_else(|| transition_lost(onboarding_id))?;
    tx.commit().await?;

    Ok(updated)
}

async fn load(pool: &PgPool, tenant_id: &str, id: DbId) -> AppResult<OnboardingRecord> {
    OnboardingRepo::find_by_id(pool, tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Onboarding application",
            id,
        }))
}

fn transition_lost(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Onboarding application {id} changed state concurrently"
    )))
}
