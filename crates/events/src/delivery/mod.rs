//! External delivery channels for registry notifications.
//!
//! Webhook fan-out is the only outbound channel: each tenant registers
//! subscriptions and receives HMAC-signed JSON POSTs for matching events.

pub mod webhook;
