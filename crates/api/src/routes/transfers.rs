//! Route definitions for transfer validation, execution, and approval.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transfers;
use crate::state::AppState;

/// Routes mounted at `/transfers`.
///
/// ```text
/// POST /               -> execute
/// POST /validate       -> validate
/// POST /simulate       -> simulate
/// GET  /pending        -> list_pending
/// GET  /{id}           -> get_by_id
/// POST /{id}/approve   -> approve
/// POST /{id}/reject    -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(transfers::execute))
        .route("/validate", post(transfers::validate))
        .route("/simulate", post(transfers::simulate))
        .route("/pending", get(transfers::list_pending))
        .route("/{id}", get(transfers::get_by_id))
        .route("/{id}/approve", post(transfers::approve))
        .route("/{id}/reject", post(transfers::reject))
}
