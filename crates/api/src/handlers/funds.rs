//! Handlers for the `/funds` resource and nested eligibility criteria.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::eligibility::FundStatus;
use registra_core::error::CoreError;
use registra_core::investor::InvestorType;
use registra_core::types::DbId;
use registra_db::models::eligibility_criteria::{CreateEligibilityCriteria, EligibilityCriteria};
use registra_db::models::fund_structure::{
    CreateFundStructure, FundStructure, UpdateFundStructure,
};
use registra_db::repositories::{EligibilityCriteriaRepo, FundStructureRepo};
use registra_events::RegistryEvent;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/funds
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateFundStructure>,
) -> AppResult<(StatusCode, Json<FundStructure>)> {
    if let Some(status) = &input.status {
        status.parse::<FundStatus>()?;
    }

    let fund = FundStructureRepo::create(&state.pool, &user.tenant_id, &input).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "fund.created")
            .with_entity("fund_structure", fund.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "name": fund.name, "legal_form": fund.legal_form })),
    );

    Ok((StatusCode::CREATED, Json(fund)))
}

/// GET /api/v1/funds
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<FundStructure>>>> {
    let funds = FundStructureRepo::list(&state.pool, &user.tenant_id).await?;
    Ok(Json(DataResponse { data: funds }))
}

/// GET /api/v1/funds/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<FundStructure>> {
    let fund = FundStructureRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund structure",
            id,
        }))?;
    Ok(Json(fund))
}

/// PUT /api/v1/funds/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFundStructure>,
) -> AppResult<Json<FundStructure>> {
    if let Some(status) = &input.status {
        status.parse::<FundStatus>()?;
    }

    let fund = FundStructureRepo::update(&state.pool, &user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund structure",
            id,
        }))?;
    Ok(Json(fund))
}

// ---------------------------------------------------------------------------
// Eligibility criteria (nested under a fund)
// ---------------------------------------------------------------------------

/// POST /api/v1/funds/{id}/criteria
///
/// Creates a criteria row, superseding any active row for the same
/// (jurisdiction, investor type) pair.
pub async fn create_criteria(
    State(state): State<AppState>,
    user: AuthUser,
    Path(fund_id): Path<DbId>,
    Json(input): Json<CreateEligibilityCriteria>,
) -> AppResult<(StatusCode, Json<EligibilityCriteria>)> {
    input.investor_type.parse::<InvestorType>()?;

    FundStructureRepo::find_by_id(&state.pool, &user.tenant_id, fund_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund structure",
            id: fund_id,
        }))?;

    let criteria =
        EligibilityCriteriaRepo::create(&state.pool, &user.tenant_id, fund_id, &input).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "criteria.published")
            .with_entity("eligibility_criteria", criteria.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "fund_structure_id": fund_id,
                "jurisdiction": criteria.jurisdiction,
                "investor_type": criteria.investor_type,
            })),
    );

    Ok((StatusCode::CREATED, Json(criteria)))
}

/// GET /api/v1/funds/{id}/criteria
pub async fn list_criteria(
    State(state): State<AppState>,
    user: AuthUser,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EligibilityCriteria>>>> {
    let criteria =
        EligibilityCriteriaRepo::list_by_fund(&state.pool, &user.tenant_id, fund_id).await?;
    Ok(Json(DataResponse { data: criteria }))
}
