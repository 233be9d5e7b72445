//! Registra domain core.
//!
//! Pure compliance decision logic: no database access, no I/O. The
//! evaluators in this crate operate on snapshot types loaded by the API
//! layer and return structured check results suitable for decision
//! records:
//!
//! - [`rules`]: condition evaluator, composite rule engine, and the
//!   built-in structural transfer checks.
//! - [`eligibility`]: criteria resolution and investor eligibility checks.
//! - [`decision`]: decision record derivation and the integrity hash chain.
//! - [`onboarding`]: onboarding workflow states and transition guards.
//! - [`transfer`]: transfer states and the manual-approval gate.

pub mod decision;
pub mod eligibility;
pub mod error;
pub mod investor;
pub mod onboarding;
pub mod rules;
pub mod transfer;
pub mod types;
