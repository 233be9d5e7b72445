//! Handlers for the `/transfers` resource: validation, simulation,
//! execution and manual settlement of pending transfers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::error::CoreError;
use registra_core::types::DbId;
use registra_db::models::transfer::{CreateTransfer, Transfer};
use registra_db::repositories::TransferRepo;
use registra_events::RegistryEvent;
use serde::Deserialize;
use serde_json::json;

use crate::compliance::transfer as transfer_service;
use crate::compliance::transfer::{TransferEvaluation, TransferOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/transfers/validate
///
/// Run all checks without moving units. The decision record carries the
/// derived result.
pub async fn validate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTransfer>,
) -> AppResult<Json<TransferEvaluation>> {
    let evaluation =
        transfer_service::validate(&state.pool, &user.tenant_id, user.user_id, &input).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/transfers/simulate
///
/// Dry-run: identical checks, decision record marked `simulated`.
pub async fn simulate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTransfer>,
) -> AppResult<Json<TransferEvaluation>> {
    let evaluation =
        transfer_service::simulate(&state.pool, &user.tenant_id, user.user_id, &input).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/transfers
///
/// Execute a transfer. Returns 201 with the executed (or pending) row;
/// a rule violation surfaces as 422 after its decision record commits.
pub async fn execute(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTransfer>,
) -> AppResult<(StatusCode, Json<TransferOutcome>)> {
    let outcome =
        match transfer_service::execute(&state.pool, &user.tenant_id, user.user_id, &input).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, AppError::Core(CoreError::BusinessLogic(_))) {
                    state.event_bus.publish(
                        RegistryEvent::new(&user.tenant_id, "transfer.rejected")
                            .with_entity("asset", input.asset_id)
                            .with_actor(user.user_id)
                            .with_payload(json!({
                                "from_investor_id": input.from_investor_id,
                                "to_investor_id": input.to_investor_id,
                                "units": input.units,
                            })),
                    );
                }
                return Err(err);
            }
        };

    let event_type = if outcome.transfer.status == "pending_approval" {
        "transfer.pending_approval"
    } else {
        "transfer.executed"
    };
    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, event_type)
            .with_entity("transfer", outcome.transfer.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "asset_id": outcome.transfer.asset_id,
                "units": outcome.transfer.units,
                "status": outcome.transfer.status,
            })),
    );

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/v1/transfers/pending
pub async fn list_pending(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Transfer>>>> {
    let pending = TransferRepo::list_pending(&state.pool, &user.tenant_id).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// GET /api/v1/transfers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Transfer>> {
    let transfer = TransferRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transfer",
            id,
        }))?;
    Ok(Json(transfer))
}

/// POST /api/v1/transfers/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Transfer>> {
    let transfer =
        transfer_service::approve(&state.pool, &user.tenant_id, user.user_id, id).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "transfer.approved")
            .with_entity("transfer", transfer.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "asset_id": transfer.asset_id, "units": transfer.units })),
    );

    Ok(Json(transfer))
}

/// Request body for `POST /transfers/{id}/reject`.
#[derive(Debug, Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// POST /api/v1/transfers/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<Transfer>> {
    let transfer = transfer_service::reject(
        &state.pool,
        &user.tenant_id,
        user.user_id,
        id,
        input.reason.as_deref(),
    )
    .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "transfer.rejected")
            .with_entity("transfer", transfer.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "asset_id": transfer.asset_id, "units": transfer.units })),
    );

    Ok(Json(transfer))
}
