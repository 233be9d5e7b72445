//! Route definitions for the decision record chain.

use axum::routing::get;
use axum::Router;

use crate::handlers::decisions;
use crate::state::AppState;

/// Routes mounted at `/decisions`.
///
/// ```text
/// GET /                                   -> list_recent (?limit, offset)
/// GET /verify-chain                       -> verify_chain
/// GET /subject/{subject_type}/{subject_id} -> list_by_subject
/// GET /{id}                               -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decisions::list_recent))
        .route("/verify-chain", get(decisions::verify_chain))
        .route(
            "/subject/{subject_type}/{subject_id}",
            get(decisions::list_by_subject),
        )
        .route("/{id}", get(decisions::get_by_id))
}
