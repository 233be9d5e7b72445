//! HTTP API for the registry: REST surface over the compliance decision
//! core, backed by Postgres and the in-process event bus.

pub mod auth;
pub mod compliance;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;
