//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] sends a JSON-encoded [`RegistryEvent`] to an
//! external URL via HTTP POST, signing the body with HMAC-SHA256 so the
//! receiver can authenticate it. Failed attempts are retried up to three
//! times with exponential backoff (1 s, 2 s, 4 s).
//! [`WebhookDispatcher`] is the background task that fans bus events out
//! to every matching subscription.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::PgPool;
use tokio::sync::broadcast;

use registra_db::models::webhook::WebhookSubscription;
use registra_db::repositories::WebhookRepo;

use crate::bus::RegistryEvent;

/// Signature header carried on every delivery.
pub const SIGNATURE_HEADER: &str = "X-Registra-Signature";

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers registry events to external webhook endpoints.
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// Deliver an event payload to a webhook URL with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    pub async fn deliver(
        &self,
        url: &str,
        secret: &str,
        event: &RegistryEvent,
    ) -> Result<(), WebhookError> {
        let payload = serde_json::json!({
            "event_type": event.event_type,
            "entity_type": event.entity_type,
            "entity_id": event.entity_id,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });
        let body = payload.to_string();
        let signature = sign_payload(secret, body.as_bytes());

        let mut last_err: Option<WebhookError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(url, &body, &signature).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(url, &body, &signature).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url, error = %e, "Webhook delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, body: &str, signature: &str) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body.to_string())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl Default for WebhookDelivery {
    fn default() -> Self {
        Self::new()
    }
}

/// HMAC-SHA256 of the request body, formatted as `sha256=<hex>`.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("sha256={hex}")
}

/// Whether a subscription wants this event type.
fn matches(subscription: &WebhookSubscription, event_type: &str) -> bool {
    match subscription.event_types.as_array() {
        Some(types) => types
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| t == "*" || t == event_type),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// WebhookDispatcher
// ---------------------------------------------------------------------------

/// Background task fanning bus events out to matching subscriptions.
pub struct WebhookDispatcher;

impl WebhookDispatcher {
    /// Run the dispatch loop until the bus is dropped.
    ///
    /// Subscriptions are loaded per event so newly registered endpoints
    /// take effect without a restart. A failing endpoint never blocks
    /// other deliveries; each one runs as its own task.
    pub async fn run(pool: PgPool, mut receiver: broadcast::Receiver<RegistryEvent>) {
        let delivery = std::sync::Arc::new(WebhookDelivery::new());
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let subscriptions =
                        match WebhookRepo::list_enabled(&pool, &event.tenant_id).await {
                            Ok(subs) => subs,
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to load webhook subscriptions");
                                continue;
                            }
                        };
                    for sub in subscriptions {
                        if !matches(&sub, &event.event_type) {
                            continue;
                        }
                        let delivery = delivery.clone();
                        let event = event.clone();
                        tokio::spawn(async move {
                            if let Err(e) = delivery.deliver(&sub.url, &sub.secret, &event).await {
                                tracing::error!(
                                    subscription_id = sub.id,
                                    url = %sub.url,
                                    error = %e,
                                    "Webhook delivery gave up"
                                );
                            }
                        });
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook dispatcher lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, webhook dispatcher shutting down");
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
