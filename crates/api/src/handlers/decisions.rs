//! Read-only handlers for the append-only decision record chain.

use axum::extract::{Path, Query, State};
use axum::Json;
use registra_core::error::CoreError;
use registra_core::types::DbId;
use registra_db::models::decision_record::{ChainVerification, DecisionRecord};
use registra_db::repositories::DecisionRecordRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/decisions
pub async fn list_recent(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<DecisionRecord>>>> {
    let records = DecisionRecordRepo::list_recent(
        &state.pool,
        &user.tenant_id,
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/decisions/verify-chain
///
/// Recomputes every hash in the tenant's chain and reports the first
/// break, if any.
pub async fn verify_chain(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ChainVerification>> {
    let verification = DecisionRecordRepo::verify_chain(&state.pool, &user.tenant_id).await?;
    Ok(Json(verification))
}

/// GET /api/v1/decisions/subject/{subject_type}/{subject_id}
pub async fn list_by_subject(
    State(state): State<AppState>,
    user: AuthUser,
    Path((subject_type, subject_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<DecisionRecord>>>> {
    let records = DecisionRecordRepo::list_by_subject(
        &state.pool,
        &user.tenant_id,
        &subject_type,
        subject_id,
    )
    .await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/decisions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DecisionRecord>> {
    let record = DecisionRecordRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Decision record",
            id,
        }))?;
    Ok(Json(record))
}
