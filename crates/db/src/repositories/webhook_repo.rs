//! Repository for the `webhook_subscriptions` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::webhook::{CreateWebhookSubscription, WebhookSubscription};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, tenant_id, url, secret, event_types, enabled, created_at, updated_at";

/// Provides CRUD operations for webhook subscriptions.
pub struct WebhookRepo;

impl WebhookRepo {
    /// Insert a new subscription, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateWebhookSubscription,
    ) -> Result<WebhookSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO webhook_subscriptions (tenant_id, url, secret, event_types)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(tenant_id)
            .bind(&input.url)
            .bind(&input.secret)
            .bind(serde_json::json!(input.event_types))
            .fetch_one(pool)
            .await
    }

    /// List the enabled subscriptions for a tenant.
    pub async fn list_enabled(
        pool: &PgPool,
        tenant_id: &str,
    ) -> Result<Vec<WebhookSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM webhook_subscriptions
             WHERE tenant_id = $1 AND enabled = TRUE
             ORDER BY id"
        );
        sqlx::query_as::<_, WebhookSubscription>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Disable a subscription. Returns `true` if a row was updated.
    pub async fn disable(pool: &PgPool, tenant_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE webhook_subscriptions SET enabled = FALSE, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2 AND enabled = TRUE",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a subscription. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM webhook_subscriptions WHERE tenant_id = $1 AND id = $2")
                .bind(tenant_id)
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
