//! Registra event bus and outbound notification infrastructure.
//!
//! Building blocks for the registry-wide event system:
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RegistryEvent`]: the canonical domain event envelope.
//! - [`EventPersistence`]: background service that durably writes every
//!   event to the `events` table.
//! - [`delivery`]: webhook fan-out with HMAC-signed payloads.

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, RegistryEvent};
pub use delivery::webhook::{WebhookDelivery, WebhookDispatcher};
pub use persistence::EventPersistence;
