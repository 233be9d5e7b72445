//! Route definitions for assets and their asset-scoped sub-resources.
//!
//! Rule set and composite rule routes are asset-scoped here; the
//! asset-independent rule endpoints live in [`super::rules`].

use axum::routing::get;
use axum::Router;

use crate::handlers::{assets, rules};
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// GET    /{id}                            -> get_by_id
/// PUT    /{id}                            -> update
/// GET    /{asset_id}/holdings             -> list_holdings
/// POST   /{asset_id}/holdings             -> create_holding
/// GET    /{asset_id}/transfers            -> list_transfers
/// GET    /{asset_id}/rule-sets            -> list_rule_sets
/// POST   /{asset_id}/rule-sets            -> publish_rule_set
/// GET    /{asset_id}/rule-sets/active     -> get_active_rule_set
/// GET    /{asset_id}/rule-sets/{version}  -> get_rule_set_version
/// GET    /{asset_id}/rules                -> list_composite_rules
/// POST   /{asset_id}/rules                -> create_composite_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list).post(assets::create))
        .route("/{id}", get(assets::get_by_id).put(assets::update))
        .route(
            "/{asset_id}/holdings",
            get(assets::list_holdings).post(assets::create_holding),
        )
        .route("/{asset_id}/transfers", get(assets::list_transfers))
        .route(
            "/{asset_id}/rule-sets",
            get(rules::list_rule_sets).post(rules::publish_rule_set),
        )
        .route("/{asset_id}/rule-sets/active", get(rules::get_active_rule_set))
        .route(
            "/{asset_id}/rule-sets/{version}",
            get(rules::get_rule_set_version),
        )
        .route(
            "/{asset_id}/rules",
            get(rules::list_composite_rules).post(rules::create_composite_rule),
        )
}
