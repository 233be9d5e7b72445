//! Handlers for webhook subscription management.
//!
//! The signing secret is returned exactly once, in the creation response.
//! Subsequent reads expose the subscription without the secret.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rand::distr::Alphanumeric;
use rand::Rng;
use registra_core::error::CoreError;
use registra_core::types::{DbId, Timestamp};
use registra_db::models::webhook::{CreateWebhookSubscription, WebhookSubscription};
use registra_db::repositories::WebhookRepo;
use registra_events::RegistryEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const SECRET_LENGTH: usize = 48;

/// Request body for `POST /webhooks`.
///
/// When `secret` is omitted a random one is generated server-side.
#[derive(Debug, Deserialize)]
pub struct RegisterWebhookRequest {
    pub url: String,
    pub secret: Option<String>,
    pub event_types: Vec<String>,
}

/// Creation response. The only place the plaintext secret appears.
#[derive(Debug, Serialize)]
pub struct RegisteredWebhook {
    pub id: DbId,
    pub url: String,
    pub secret: String,
    pub event_types: serde_json::Value,
    pub enabled: bool,
    pub created_at: Timestamp,
}

/// Subscription view without the secret, for listings.
#[derive(Debug, Serialize)]
pub struct WebhookView {
    pub id: DbId,
    pub url: String,
    pub event_types: serde_json::Value,
    pub enabled: bool,
    pub created_at: Timestamp,
}

impl From<WebhookSubscription> for WebhookView {
    fn from(sub: WebhookSubscription) -> Self {
        Self {
            id: sub.id,
            url: sub.url,
            event_types: sub.event_types,
            enabled: sub.enabled,
            created_at: sub.created_at,
        }
    }
}

/// POST /api/v1/webhooks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<RegisterWebhookRequest>,
) -> AppResult<(StatusCode, Json<RegisteredWebhook>)> {
    if !input.url.starts_with("http://") && !input.url.starts_with("https://") {
        return Err(AppError::Core(CoreError::Validation(
            "Webhook URL must be an http or https URL".into(),
        )));
    }
    if input.event_types.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one event type is required".into(),
        )));
    }

    let secret = input.secret.unwrap_or_else(generate_secret);
    let created = WebhookRepo::create(
        &state.pool,
        &user.tenant_id,
        &CreateWebhookSubscription {
            url: input.url,
            secret: secret.clone(),
            event_types: input.event_types,
        },
    )
    .await?;

    state.event_bus.publish(
        RegistryEvent::new(&user.tenant_id, "webhook.registered")
            .with_entity("webhook", created.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "url": created.url })),
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisteredWebhook {
            id: created.id,
            url: created.url,
            secret,
            event_types: created.event_types,
            enabled: created.enabled,
            created_at: created.created_at,
        }),
    ))
}

/// GET /api/v1/webhooks
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<WebhookView>>>> {
    let subscriptions = WebhookRepo::list_enabled(&state.pool, &user.tenant_id).await?;
    Ok(Json(DataResponse {
        data: subscriptions.into_iter().map(WebhookView::from).collect(),
    }))
}

/// POST /api/v1/webhooks/{id}/disable
pub async fn disable(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let disabled = WebhookRepo::disable(&state.pool, &user.tenant_id, id).await?;
    if !disabled {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Webhook subscription",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/webhooks/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = WebhookRepo::delete(&state.pool, &user.tenant_id, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Webhook subscription",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_long_and_unique() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), SECRET_LENGTH);
        assert_ne!(a, b);
    }
}
