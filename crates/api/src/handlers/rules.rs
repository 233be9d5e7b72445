//! Handlers for rule sets and composite rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::error::CoreError;
use registra_core::rules::condition::ConditionField;
use registra_core::types::DbId;
use registra_db::models::composite_rule::{
    CompositeRule, CreateCompositeRule, UpdateCompositeRule,
};
use registra_db::models::rule_set::{CreateRuleSet, RuleSet};
use registra_db::repositories::{CompositeRuleRepo, RuleSetRepo};
use registra_events::RegistryEvent;
use serde_json::json;

use crate::compliance::rules as rules_service;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Rule sets (versioned, per asset)
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/{id}/rule-sets
///
/// Publish a new rule-set version, superseding the active one.
pub async fn publish_rule_set(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
    Json(input): Json<CreateRuleSet>,
) -> AppResult<(StatusCode, Json<RuleSet>)> {
    let rule_set = rules_service::publish_rule_set(
        &state.pool,
        &user.tenant_id,
        user.user_id,
        asset_id,
        &input,
    )
    .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "rules.published")
            .with_entity("rule_set", rule_set.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "asset_id": asset_id, "version": rule_set.version })),
    );

    Ok((StatusCode::CREATED, Json(rule_set)))
}

/// GET /api/v1/assets/{id}/rule-sets
///
/// Full version history, newest first.
pub async fn list_rule_sets(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RuleSet>>>> {
    let versions = RuleSetRepo::list_versions(&state.pool, &user.tenant_id, asset_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /api/v1/assets/{id}/rule-sets/active
pub async fn get_active_rule_set(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<RuleSet>> {
    let rule_set = RuleSetRepo::find_active(&state.pool, &user.tenant_id, asset_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Active rule set",
            id: asset_id,
        }))?;
    Ok(Json(rule_set))
}

/// GET /api/v1/assets/{id}/rule-sets/{version}
pub async fn get_rule_set_version(
    State(state): State<AppState>,
    user: AuthUser,
    Path((asset_id, version)): Path<(DbId, i32)>,
) -> AppResult<Json<RuleSet>> {
    let rule_set = RuleSetRepo::find_version(&state.pool, &user.tenant_id, asset_id, version)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Rule set version",
            id: version as DbId,
        }))?;
    Ok(Json(rule_set))
}

// ---------------------------------------------------------------------------
// Composite rules
// ---------------------------------------------------------------------------

/// GET /api/v1/rules/fields
///
/// The condition fields composite rules may reference.
pub async fn list_condition_fields() -> Json<DataResponse<&'static [&'static str]>> {
    Json(DataResponse {
        data: ConditionField::KNOWN_FIELDS,
    })
}

/// POST /api/v1/assets/{id}/rules
pub async fn create_composite_rule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
    Json(input): Json<CreateCompositeRule>,
) -> AppResult<(StatusCode, Json<CompositeRule>)> {
    let rule =
        rules_service::create_composite_rule(&state.pool, &user.tenant_id, asset_id, &input)
            .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "rule.created")
            .with_entity("composite_rule", rule.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "asset_id": asset_id, "name": rule.name })),
    );

    Ok((StatusCode::CREATED, Json(rule)))
}

/// GET /api/v1/assets/{id}/rules
pub async fn list_composite_rules(
    State(state): State<AppState>,
    user: AuthUser,
    Path(asset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CompositeRule>>>> {
    let rules = CompositeRuleRepo::list_by_asset(&state.pool, &user.tenant_id, asset_id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// PUT /api/v1/rules/{id}
pub async fn update_composite_rule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompositeRule>,
) -> AppResult<Json<CompositeRule>> {
    let rule =
        rules_service::update_composite_rule(&state.pool, &user.tenant_id, id, &input).await?;
    Ok(Json(rule))
}

/// DELETE /api/v1/rules/{id}
pub async fn delete_composite_rule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CompositeRuleRepo::delete(&state.pool, &user.tenant_id, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Composite rule",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
