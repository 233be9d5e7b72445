//! Orchestration between the HTTP layer, the pure rule engine and the
//! repositories.
//!
//! Handlers stay thin: they parse the request, call one service function
//! here, and serialize the outcome. Services load consistent snapshots,
//! run the evaluators from `registra_core`, append decision records and
//! mutate state inside a single transaction.

pub mod context;
pub mod eligibility;
pub mod onboarding;
pub mod recorder;
pub mod rules;
pub mod transfer;
