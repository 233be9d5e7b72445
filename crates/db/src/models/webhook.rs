//! Webhook subscription entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `webhook_subscriptions` table.
///
/// `event_types` is a JSONB array of event type names; `["*"]`
/// subscribes to everything. `secret` signs outgoing payloads and is
/// never serialized back to clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookSubscription {
    pub id: DbId,
    pub tenant_id: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub event_types: serde_json::Value,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a webhook subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhookSubscription {
    pub url: String,
    pub secret: String,
    #[serde(default = "default_event_types")]
    pub event_types: Vec<String>,
}

fn default_event_types() -> Vec<String> {
    vec!["*".to_string()]
}
