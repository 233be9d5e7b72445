//! Route definitions for webhook subscription management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// POST   /{id}/disable   -> disable
/// DELETE /{id}           -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(webhooks::list).post(webhooks::create))
        .route("/{id}", axum::routing::delete(webhooks::delete))
        .route("/{id}/disable", post(webhooks::disable))
}
