//! Route definitions for investor management.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::investors;
use crate::state::AppState;

/// Routes mounted at `/investors`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update
/// DELETE /{id}           -> delete
/// PUT    /{id}/kyc       -> update_kyc
/// GET    /{id}/holdings  -> list_holdings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(investors::list).post(investors::create))
        .route(
            "/{id}",
            get(investors::get_by_id)
                .put(investors::update)
                .delete(investors::delete),
        )
        .route("/{id}/kyc", put(investors::update_kyc))
        .route("/{id}/holdings", get(investors::list_holdings))
}
