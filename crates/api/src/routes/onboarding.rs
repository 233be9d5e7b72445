//! Route definitions for the investor onboarding workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// ```text
/// GET  /                         -> list (?status)
/// POST /                         -> apply
/// GET  /{id}                     -> get_by_id
/// POST /{id}/check-eligibility   -> check_eligibility
/// POST /{id}/approve             -> approve
/// POST /{id}/reject              -> reject
/// POST /{id}/allocate            -> allocate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(onboarding::list).post(onboarding::apply))
        .route("/{id}", get(onboarding::get_by_id))
        .route("/{id}/check-eligibility", post(onboarding::check_eligibility))
        .route("/{id}/approve", post(onboarding::approve))
        .route("/{id}/reject", post(onboarding::reject))
        .route("/{id}/allocate", post(onboarding::allocate))
}
