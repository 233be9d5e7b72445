//! Transfer validation, simulation, execution and manual settlement.
//!
//! Execution runs in one transaction: holdings are locked, the rule
//! engine judges the request, a decision record is appended, and the
//! unit moves (or the pending row) commit together. Validation and
//! simulation run the same checks without touching holdings.

use sqlx::PgPool;

use registra_core::decision::{
    build_result_details, derive_result, DecisionCheck, DecisionResult, DecisionType,
};
use registra_core::eligibility::run_eligibility_checks;
use registra_core::error::CoreError;
use registra_core::rules::builtin::{validate_request, validate_transfer, TransferValidation};
use registra_core::rules::context::TransferRequest;
use registra_core::transfer::{requires_manual_approval, TransferStatus};
use registra_core::types::DbId;
use registra_db::models::transfer::{CreateTransfer, Transfer};
use registra_db::repositories::{
    DecisionRecordRepo, HoldingRepo, TransferRepo,
};
use serde::Serialize;
use serde_json::json;

use crate::compliance::context::{self, load_transfer_basis, TransferBasis};
use crate::compliance::recorder::{build_decision_record, SUBJECT_INVESTOR, SUBJECT_TRANSFER};
use crate::error::{AppError, AppResult};

/// Outcome of a non-mutating evaluation (validate or simulate).
#[derive(Debug, Serialize)]
pub struct TransferEvaluation {
    pub valid: bool,
    pub checks: Vec<DecisionCheck>,
    pub violations: Vec<String>,
    pub rule_set_version: Option<i32>,
    pub decision_record_id: DbId,
}

/// Outcome of a successful execution: the persisted transfer plus the
/// checks that allowed it.
#[derive(Debug, Serialize)]
pub struct TransferOutcome {
    pub transfer: Transfer,
    pub checks: Vec<DecisionCheck>,
}

/// When the asset belongs to a fund structure, the receiver must also
/// clear the fund's eligibility criteria; the resulting checks are
/// appended to the transfer validation. Fund state comes from the
/// basis, loaded with the rest of the read set.
fn append_fund_eligibility(basis: &TransferBasis, validation: &mut TransferValidation) {
    let Some(fund) = &basis.fund else {
        return;
    };

    let amount = basis
        .asset
        .unit_price_cents
        .map(|price| price.saturating_mul(basis.request.units));
    let evaluation = run_eligibility_checks(
        &basis.to_investor,
        fund,
        basis.fund_criteria.as_ref(),
        amount,
        chrono::Utc::now(),
    );

    validation.valid = validation.valid && evaluation.checks.iter().all(|c| c.passed);
    validation.checks.extend(evaluation.checks);
}

/// Snapshots stored on every transfer decision record: the full
/// evaluation context, and the rule state that was in force.
fn evaluation_snapshots(
    ctx: &registra_core::rules::context::ValidationContext,
    basis: &TransferBasis,
) -> AppResult<(serde_json::Value, serde_json::Value)> {
    let input_snapshot = serde_json::to_value(ctx).map_err(|e| {
        AppError::InternalError(format!("Failed to serialize evaluation context: {e}"))
    })?;
    let rule_version_snapshot = json!({
        "rule_set_version": basis.rule_set_version,
        "rule_set": basis.rules,
        "composite_rules": basis.composite_rules,
        "fund_criteria": basis.fund_criteria,
    });
    Ok((input_snapshot, rule_version_snapshot))
}

fn to_request(input: &CreateTransfer) -> TransferRequest {
    TransferRequest {
        asset_id: input.asset_id,
        from_investor_id: input.from_investor_id,
        to_investor_id: input.to_investor_id,
        units: input.units,
        execution_date: input.execution_date.unwrap_or_else(chrono::Utc::now),
    }
}

/// Run the full rule set against a proposed transfer without executing
/// it, appending a decision record with the derived result.
pub async fn validate(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    input: &CreateTransfer,
) -> AppResult<TransferEvaluation> {
    evaluate(pool, tenant_id, actor, input, false).await
}

/// Dry-run a proposed transfer. Identical checks to [`validate`], but
/// the decision record is marked `simulated` so reporting can separate
/// what-if queries from real validations.
pub async fn simulate(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    input: &CreateTransfer,
) -> AppResult<TransferEvaluation> {
    evaluate(pool, tenant_id, actor, input, true).await
}

async fn evaluate(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    input: &CreateTransfer,
    simulated: bool,
) -> AppResult<TransferEvaluation> {
    let basis = load_transfer_basis(pool, tenant_id, to_request(input)).await?;

    let from_holding =
        HoldingRepo::find(pool, tenant_id, input.asset_id, input.from_investor_id).await?;
    let to_holding =
        HoldingRepo::find(pool, tenant_id, input.asset_id, input.to_investor_id).await?;

    let ctx = basis.context(
        from_holding.as_ref().map(context::holding_snapshot),
        to_holding.as_ref().map(context::holding_snapshot),
    );
    validate_request(&ctx)?;

    let mut validation = validate_transfer(&ctx, &basis.composite_rules);
    append_fund_eligibility(&basis, &mut validation);
    let result = if simulated {
        DecisionResult::Simulated
    } else {
        derive_result(&validation.checks)
    };
    let details = build_result_details(validation.checks.clone(), result);
    let (input_snapshot, rule_version_snapshot) = evaluation_snapshots(&ctx, &basis)?;

    let record_input = build_decision_record(
        DecisionType::TransferValidation,
        // No transfer row exists for a non-mutating evaluation; the
        // subject is the sending investor's request, keyed by sender.
        SUBJECT_INVESTOR,
        input.from_investor_id,
        Some(input.asset_id),
        basis.rule_set_version,
        input_snapshot,
        rule_version_snapshot,
        result,
        &details,
        Some(actor),
    )?;

    let mut tx = pool.begin().await?;
    let record = DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;
    tx.commit().await?;

    Ok(TransferEvaluation {
        valid: validation.valid,
        violations: validation.violations(),
        checks: validation.checks,
        rule_set_version: basis.rule_set_version,
        decision_record_id: record.id,
    })
}

/// Execute a transfer: validate, persist the decision, and move units
/// (or park the transfer for manual approval) in one transaction.
///
/// A rejected execution commits only its decision record, then
/// surfaces as [`CoreError::BusinessLogic`]. No transfer row is kept.
pub async fn execute(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    input: &CreateTransfer,
) -> AppResult<TransferOutcome> {
    let basis = load_transfer_basis(pool, tenant_id, to_request(input)).await?;

    let mut tx = pool.begin().await?;

    let from_holding =
        HoldingRepo::find_locked(&mut tx, tenant_id, input.asset_id, input.from_investor_id)
            .await?;
    let to_holding =
        HoldingRepo::find_locked(&mut tx, tenant_id, input.asset_id, input.to_investor_id).await?;

    let ctx = basis.context(
        from_holding.as_ref().map(context::holding_snapshot),
        to_holding.as_ref().map(context::holding_snapshot),
    );
    validate_request(&ctx)?;

    let mut validation = validate_transfer(&ctx, &basis.composite_rules);
    append_fund_eligibility(&basis, &mut validation);

    if !validation.valid {
        // No transfer row for a rejected execution; only the decision
        // record exists, keyed by the sending investor's request.
        let details =
            build_result_details(validation.checks.clone(), DecisionResult::Rejected);
        let (input_snapshot, rule_version_snapshot) = evaluation_snapshots(&ctx, &basis)?;
        let record_input = build_decision_record(
            DecisionType::TransferValidation,
            SUBJECT_INVESTOR,
            input.from_investor_id,
            Some(input.asset_id),
            basis.rule_set_version,
            input_snapshot,
            rule_version_snapshot,
            DecisionResult::Rejected,
            &details,
            Some(actor),
        )?;
        DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;
        tx.commit().await?;

        let violations = validation.violations().join("; ");
        return Err(AppError::Core(CoreError::BusinessLogic(format!(
            "Transfer rejected: {violations}"
        ))));
    }

    let pending = requires_manual_approval(&basis.rules, input.units);
    let (status, pending_reason) = if pending {
        let threshold = basis.rules.approval_threshold_units.unwrap_or_default();
        (
            TransferStatus::PendingApproval,
            Some(format!(
                "Transfer of {} units meets the approval threshold of {threshold}",
                input.units
            )),
        )
    } else {
        (TransferStatus::Executed, None)
    };

    if !pending {
        move_units(&mut tx, tenant_id, &ctx.transfer).await?;
    }

    let transfer = TransferRepo::insert(
        &mut tx,
        tenant_id,
        input.asset_id,
        input.from_investor_id,
        input.to_investor_id,
        input.units,
        ctx.transfer.execution_date,
        status.as_str(),
        pending_reason.as_deref(),
        None,
    )
    .await?;

    let details = build_result_details(validation.checks.clone(), DecisionResult::Approved);
    let (input_snapshot, rule_version_snapshot) = evaluation_snapshots(&ctx, &basis)?;
    let record_input = build_decision_record(
        DecisionType::TransferValidation,
        SUBJECT_TRANSFER,
        transfer.id,
        Some(input.asset_id),
        basis.rule_set_version,
        input_snapshot,
        rule_version_snapshot,
        DecisionResult::Approved,
        &details,
        Some(actor),
    )?;
    let record = DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;
    TransferRepo::link_decision(&mut tx, tenant_id, transfer.id, record.id).await?;

    tx.commit().await?;

    // Re-read so the returned row carries the decision link.
    let transfer = TransferRepo::find_by_id(pool, tenant_id, transfer.id)
        .await?
        .unwrap_or(transfer);

    Ok(TransferOutcome {
        transfer,
        checks: validation.checks,
    })
}

/// Approve a transfer parked in `pending_approval`, moving its units.
pub async fn approve(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    transfer_id: DbId,
) -> AppResult<Transfer> {
    let mut tx = pool.begin().await?;

    let transfer = TransferRepo::find_locked(&mut tx, tenant_id, transfer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transfer",
            id: transfer_id,
        }))?;
    ensure_pending(&transfer)?;

    let request = TransferRequest {
        asset_id: transfer.asset_id,
        from_investor_id: transfer.from_investor_id,
        to_investor_id: transfer.to_investor_id,
        units: transfer.units,
        execution_date: transfer.execution_date,
    };
    move_units(&mut tx, tenant_id, &request).await?;

    let settled = TransferRepo::settle(
        &mut tx,
        tenant_id,
        transfer_id,
        TransferStatus::Executed.as_str(),
        actor,
    )
    .await?;

    let check = DecisionCheck::passed("manual_approval", "Approved by compliance review");
    let details = build_result_details(vec![check], DecisionResult::Approved);
    let record_input = build_decision_record(
        DecisionType::TransferValidation,
        SUBJECT_TRANSFER,
        transfer_id,
        Some(transfer.asset_id),
        None,
        settlement_snapshot(&transfer)?,
        json!({}),
        DecisionResult::Approved,
        &details,
        Some(actor),
    )?;
    DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;

    tx.commit().await?;
    Ok(settled)
}

/// Reject a pending transfer. No units move.
pub async fn reject(
    pool: &PgPool,
    tenant_id: &str,
    actor: DbId,
    transfer_id: DbId,
    reason: Option<&str>,
) -> AppResult<Transfer> {
    let mut tx = pool.begin().await?;

    let transfer = TransferRepo::find_locked(&mut tx, tenant_id, transfer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transfer",
            id: transfer_id,
        }))?;
    ensure_pending(&transfer)?;

    let settled = TransferRepo::settle(
        &mut tx,
        tenant_id,
        transfer_id,
        TransferStatus::Rejected.as_str(),
        actor,
    )
    .await?;

    let message = reason.unwrap_or("Rejected by compliance review");
    let check = DecisionCheck::failed("manual_approval", message);
    let details = build_result_details(vec![check], DecisionResult::Rejected);
    let record_input = build_decision_record(
        DecisionType::TransferValidation,
        SUBJECT_TRANSFER,
        transfer_id,
        Some(transfer.asset_id),
        None,
        settlement_snapshot(&transfer)?,
        json!({}),
        DecisionResult::Rejected,
        &details,
        Some(actor),
    )?;
    DecisionRecordRepo::append(&mut tx, tenant_id, &record_input).await?;

    tx.commit().await?;
    Ok(settled)
}

/// The pending row as it stood at review time, stored as the manual
/// settlement's input snapshot.
fn settlement_snapshot(transfer: &Transfer) -> AppResult<serde_json::Value> {
    serde_json::to_value(transfer).map_err(|e| {
        AppError::InternalError(format!(
            "Failed to serialize transfer for decision record: {e}"
        ))
    })
}

fn ensure_pending(transfer: &Transfer) -> AppResult<()> {
    if transfer.status != TransferStatus::PendingApproval.as_str() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Transfer {} is '{}', not pending approval",
            transfer.id, transfer.status
        ))));
    }
    Ok(())
}

/// Debit the sender and credit the receiver inside the transaction.
async fn move_units(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    tenant_id: &str,
    request: &TransferRequest,
) -> AppResult<()> {
    let debited = HoldingRepo::debit_locked(
        tx,
        tenant_id,
        request.asset_id,
        request.from_investor_id,
        request.units,
    )
    .await?;
    if !debited {
        // The balance check passed on the locked row, so this only fires
        // if the row vanished mid-transaction.
        return Err(AppError::Core(CoreError::Conflict(
            "Sender balance changed during execution".into(),
        )));
    }
    HoldingRepo::credit_locked(
        tx,
        tenant_id,
        request.asset_id,
        request.to_investor_id,
        request.units,
        request.execution_date,
    )
    .await?;
    Ok(())
}
