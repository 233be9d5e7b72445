//! Handlers for the `/onboarding` workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use registra_core::error::CoreError;
use registra_core::onboarding::OnboardingStatus;
use registra_core::types::DbId;
use registra_db::models::onboarding::{CreateOnboarding, OnboardingRecord};
use registra_db::repositories::OnboardingRepo;
use registra_events::RegistryEvent;
use serde::Deserialize;
use serde_json::json;

use crate::compliance::onboarding as onboarding_service;
use crate::compliance::onboarding::OnboardingReview;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/onboarding
pub async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateOnboarding>,
) -> AppResult<(StatusCode, Json<OnboardingRecord>)> {
    let record = onboarding_service::apply(&state.pool, &user.tenant_id, &input).await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "onboarding.applied")
            .with_entity("onboarding", record.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "investor_id": record.investor_id,
                "fund_structure_id": record.fund_structure_id,
            })),
    );

    Ok((StatusCode::CREATED, Json(record)))
}

const DEFAULT_LIMIT: i64 = 100;

/// Query parameters for `GET /onboarding`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/onboarding
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<OnboardingRecord>>>> {
    if let Some(status) = &query.status {
        status.parse::<OnboardingStatus>()?;
    }
    let records = OnboardingRepo::list(
        &state.pool,
        &user.tenant_id,
        query.status.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIMIT),
        query.offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/onboarding/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<OnboardingRecord>> {
    let record = OnboardingRepo::find_by_id(&state.pool, &user.tenant_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Onboarding application",
            id,
        }))?;
    Ok(Json(record))
}

/// POST /api/v1/onboarding/{id}/check-eligibility
///
/// Runs the eligibility checks and moves the application to `eligible`
/// or `ineligible`.
pub async fn check_eligibility(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<OnboardingReview>> {
    let review =
        onboarding_service::review_eligibility(&state.pool, &user.tenant_id, user.user_id, id)
            .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "onboarding.reviewed")
            .with_entity("onboarding", review.record.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "status": review.record.status,
                "eligible": review.evaluation.eligible,
            })),
    );

    Ok(Json(review))
}

/// Request body for approve/reject decisions.
#[derive(Debug, Deserialize, Default)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

/// POST /api/v1/onboarding/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<OnboardingRecord>> {
    let record = onboarding_service::approve(
        &state.pool,
        &user.tenant_id,
        user.user_id,
        id,
        input.notes.as_deref(),
    )
    .await?;

    publish_status_event(&state, &user, &record, "onboarding.approved");
    Ok(Json(record))
}

/// POST /api/v1/onboarding/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<OnboardingRecord>> {
    let record = onboarding_service::reject(
        &state.pool,
        &user.tenant_id,
        user.user_id,
        id,
        input.notes.as_deref(),
    )
    .await?;

    publish_status_event(&state, &user, &record, "onboarding.rejected");
    Ok(Json(record))
}

/// Request body for `POST /onboarding/{id}/allocate`.
#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub units: i64,
}

/// POST /api/v1/onboarding/{id}/allocate
///
/// Closes an approved application by creating the holding.
pub async fn allocate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AllocateRequest>,
) -> AppResult<Json<OnboardingRecord>> {
    let record =
        onboarding_service::allocate(&state.pool, &user.tenant_id, user.user_id, id, input.units)
            .await?;

    publish_status_event(&state, &user, &record, "onboarding.allocated");
    Ok(Json(record))
}

fn publish_status_event(
    state: &AppState,
    user: &AuthUser,
    record: &OnboardingRecord,
    event_type: &str,
) {
    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, event_type)
            .with_entity("onboarding", record.id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "investor_id": record.investor_id,
                "status": record.status,
            })),
    );
}
