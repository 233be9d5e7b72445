//! Route definitions for standalone eligibility checks.

use axum::routing::post;
use axum::Router;

use crate::handlers::eligibility;
use crate::state::AppState;

/// Routes mounted at `/eligibility`.
///
/// ```text
/// POST /check  -> check
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/check", post(eligibility::check))
}
