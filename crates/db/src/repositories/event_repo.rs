//! Repository for the `events` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::event::Event;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, event_type, entity_type, entity_id, actor_user_id, \
    payload, created_at";

/// Provides read/write operations for the activity log.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        tenant_id: &str,
        event_type: &str,
        entity_type: Option<&str>,
        entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (tenant_id, event_type, entity_type, entity_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(tenant_id)
        .bind(event_type)
        .bind(entity_type)
        .bind(entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List recent events ordered newest-first.
    pub async fn list_recent(
        pool: &PgPool,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE tenant_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List events for one entity, newest first.
    pub async fn list_by_entity(
        pool: &PgPool,
        tenant_id: &str,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE tenant_id = $1 AND entity_type = $2 AND entity_id = $3
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(tenant_id)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
