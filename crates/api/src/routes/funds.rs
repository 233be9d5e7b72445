//! Route definitions for fund structures and their eligibility criteria.

use axum::routing::get;
use axum::Router;

use crate::handlers::funds;
use crate::state::AppState;

/// Routes mounted at `/funds`.
///
/// ```text
/// GET  /                -> list
/// POST /                -> create
/// GET  /{id}            -> get_by_id
/// PUT  /{id}            -> update
/// GET  /{id}/criteria   -> list_criteria
/// POST /{id}/criteria   -> create_criteria
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(funds::list).post(funds::create))
        .route("/{id}", get(funds::get_by_id).put(funds::update))
        .route(
            "/{id}/criteria",
            get(funds::list_criteria).post(funds::create_criteria),
        )
}
