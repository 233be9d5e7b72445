//! Handlers for the `/assets` resource and nested holdings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::error::CoreError;
use registra_core::types::DbId;
use registra_db::models::asset::{Asset, CreateAsset, UpdateAsset};
use registra_db::models::holding::{CreateHolding, Holding};
use registra_db::models::transfer::Transfer;
use registra_db::repositories::{AssetRepo, HoldingRepo, TransferRepo};
use registra_events::RegistryEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/assets
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    if input.total_units <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "total_units must be greater than zero".into(),
        )));
    }

    let asset = AssetRepo::create(&state.pool, &user.tenant_id, &input).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "asset.created")
            .with_entity("asset", asset.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "symbol": asset.symbol, "total_units": asset.total_units })),
    );

    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/v1/assets
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Asset>>>> {
    let assets = AssetRepo::list(&state.pool, &user.tenant_id).await?;
    Ok(Json(DataResponse { data: assets }))
}

/// GET /api/v1/assets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Asset>> {
    let asset = AssetRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    Ok(Json(asset))
}

/// PUT /api/v1/assets/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    let asset = AssetRepo::update(&state.pool, &user.tenant_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    Ok(Json(asset))
}

// ---------------------------------------------------------------------------
// Holdings and transfer history (nested under an asset)
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/{id}/holdings
///
/// Registers an initial allocation outside the onboarding workflow
/// (e.g. seeding the register from an existing cap table).
pub async fn create_holding(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
    Json(mut input): Json<CreateHolding>,
) -> AppResult<(StatusCode, Json<Holding>)> {
    if input.units <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "units must be greater than zero".into(),
        )));
    }
    input.asset_id = asset_id;

    let holding = HoldingRepo::create(&state.pool, &user.tenant_id, &input).await?;
    Ok((StatusCode::CREATED, Json(holding)))
}

/// GET /api/v1/assets/{id}/holdings
///
/// Lists open positions (zero-unit rows are omitted).
pub async fn list_holdings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Holding>>>> {
    let holdings = HoldingRepo::list_by_asset(&state.pool, &user.tenant_id, asset_id).await?;
    Ok(Json(DataResponse { data: holdings }))
}

/// Query parameters for `GET /assets/{id}/transfers`.
#[derive(Debug, Deserialize)]
pub struct TransferHistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/assets/{id}/transfers
pub async fn list_transfers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
    Query(query): Query<TransferHistoryQuery>,
) -> AppResult<Json<DataResponse<Vec<Transfer>>>> {
    let transfers = TransferRepo::list_by_asset(
        &state.pool,
        &user.tenant_id,
        asset_id,
        query.limit.unwrap_or(100),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: transfers }))
}
