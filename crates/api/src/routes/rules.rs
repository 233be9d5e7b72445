//! Route definitions for asset-independent rule endpoints.
//!
//! Asset-scoped rule set and composite rule routes are mounted via
//! [`super::assets::router`]. This module covers the condition field
//! catalogue and direct rule mutation by id.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// Routes mounted at `/rules`.
///
/// ```text
/// GET    /fields  -> list_condition_fields
/// PUT    /{id}    -> update_composite_rule
/// DELETE /{id}    -> delete_composite_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fields", get(rules::list_condition_fields))
        .route(
            "/{id}",
            put(rules::update_composite_rule).delete(rules::delete_composite_rule),
        )
}
