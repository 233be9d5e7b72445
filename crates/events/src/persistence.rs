//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`RegistryEvent`] to the
//! `events` table. It runs as a long-lived background task and shuts down
//! gracefully when the bus sender is dropped.

use sqlx::PgPool;
use tokio::sync::broadcast;

use registra_core::types::DbId;
use registra_db::repositories::EventRepo;

use crate::bus::RegistryEvent;

/// Background service that persists registry events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: PgPool, mut receiver: broadcast::Receiver<RegistryEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table.
    async fn persist(pool: &PgPool, event: &RegistryEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.tenant_id,
            &event.event_type,
            event.entity_type.as_deref(),
            event.entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
    }
}
