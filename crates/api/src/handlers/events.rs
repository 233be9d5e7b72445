//! Read-only handlers for the persisted event log.

use axum::extract::{Path, Query, State};
use axum::Json;
use registra_core::types::DbId;
use registra_db::models::event::Event;
use registra_db::repositories::EventRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/events
pub async fn list_recent(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events = EventRepo::list_recent(
        &state.pool,
        &user.tenant_id,
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/entity/{entity_type}/{entity_id}
pub async fn list_by_entity(
    State(state): State<AppState>,
    user: AuthUser,
    Path((entity_type, entity_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events =
        EventRepo::list_by_entity(&state.pool, &user.tenant_id, &entity_type, entity_id).await?;
    Ok(Json(DataResponse { data: events }))
}
