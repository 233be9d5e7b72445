//! Transfer rule-set entity model and DTOs.
//!
//! Rule sets are versioned append-only: updating an asset's rules
//! inserts a new row with `version + 1` and stamps `superseded_at` on
//! the previous active row. The active rule set for an asset is the row
//! with `superseded_at IS NULL`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `rule_sets` table.
///
/// List-valued fields are JSONB in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleSet {
    pub id: DbId,
    pub tenant_id: String,
    pub asset_id: DbId,
    pub version: i32,
    pub qualification_required: bool,
    pub lockup_days: i32,
    pub jurisdiction_whitelist: serde_json::Value,
    pub transfer_whitelist: Option<serde_json::Value>,
    pub investor_type_whitelist: Option<serde_json::Value>,
    pub minimum_investment_cents: i64,
    pub maximum_investors: Option<i32>,
    pub concentration_limit_pct: Option<f64>,
    pub kyc_required: bool,
    pub approval_threshold_units: Option<i64>,
    pub created_by: Option<DbId>,
    pub superseded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO describing the full policy of a new rule-set version.
///
/// Every publish supplies the complete policy; versions never inherit
/// fields from their predecessor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRuleSet {
    pub qualification_required: bool,
    #[serde(default)]
    pub lockup_days: i32,
    #[serde(default)]
    pub jurisdiction_whitelist: Vec<String>,
    pub transfer_whitelist: Option<Vec<DbId>>,
    pub investor_type_whitelist: Option<Vec<String>>,
    #[serde(default)]
    pub minimum_investment_cents: i64,
    pub maximum_investors: Option<i32>,
    pub concentration_limit_pct: Option<f64>,
    #[serde(default = "default_kyc_required")]
    pub kyc_required: bool,
    pub approval_threshold_units: Option<i64>,
}

fn default_kyc_required() -> bool {
    true
}
