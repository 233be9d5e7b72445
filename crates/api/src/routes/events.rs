//! Route definitions for the persisted event log.

use axum::routing::get;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET /                                 -> list_recent (?limit, offset)
/// GET /entity/{entity_type}/{entity_id} -> list_by_entity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_recent))
        .route("/entity/{entity_type}/{entity_id}", get(events::list_by_entity))
}
