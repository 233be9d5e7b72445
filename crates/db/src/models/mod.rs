//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod asset;
pub mod composite_rule;
pub mod decision_record;
pub mod eligibility_criteria;
pub mod event;
pub mod fund_structure;
pub mod holding;
pub mod investor;
pub mod onboarding;
pub mod rule_set;
pub mod transfer;
pub mod user;
pub mod webhook;
