//! Handlers for the `/investors` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::error::CoreError;
use registra_core::investor::{InvestorType, KycStatus};
use registra_core::types::DbId;
use registra_db::models::holding::Holding;
use registra_db::models::investor::{CreateInvestor, Investor, UpdateInvestor, UpdateKyc};
use registra_db::repositories::{HoldingRepo, InvestorRepo};
use registra_events::RegistryEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /investors`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Default page size for investor listings.
const DEFAULT_LIMIT: i64 = 100;

/// POST /api/v1/investors
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateInvestor>,
) -> AppResult<(StatusCode, Json<Investor>)> {
    input.investor_type.parse::<InvestorType>()?;

    let investor = InvestorRepo::create(&state.pool, &user.tenant_id, &input).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "investor.created")
            .with_entity("investor", investor.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "name": investor.name, "jurisdiction": investor.jurisdiction })),
    );

    Ok((StatusCode::CREATED, Json(investor)))
}

/// GET /api/v1/investors
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Investor>>>> {
    let investors = InvestorRepo::list(
        &state.pool,
        &user.tenant_id,
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: investors }))
}

/// GET /api/v1/investors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Investor>> {
    let investor = InvestorRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id,
        }))?;
    Ok(Json(investor))
}

/// PUT /api/v1/investors/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvestor>,
) -> AppResult<Json<Investor>> {
    if let Some(t) = &input.investor_type {
        t.parse::<InvestorType>()?;
    }

    let investor = InvestorRepo::update(&state.pool, &user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id,
        }))?;
    Ok(Json(investor))
}

/// PUT /api/v1/investors/{id}/kyc
///
/// Record a KYC status change; moving to `verified` stamps the
/// verification time.
pub async fn update_kyc(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateKyc>,
) -> AppResult<Json<Investor>> {
    input.kyc_status.parse::<KycStatus>()?;

    let investor = InvestorRepo::update_kyc(&state.pool, &user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id,
        }))?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "investor.kyc_updated")
            .with_entity("investor", investor.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "kyc_status": investor.kyc_status })),
    );

    Ok(Json(investor))
}

/// DELETE /api/v1/investors/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = InvestorRepo::delete(&state.pool, &user.tenant_id, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Investor",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/investors/{id}/holdings
pub async fn list_holdings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Holding>>>> {
    let holdings = HoldingRepo::list_by_investor(&state.pool, &user.tenant_id, id).await?;
    Ok(Json(DataResponse { data: holdings }))
}
