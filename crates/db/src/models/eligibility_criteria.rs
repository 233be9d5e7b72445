//! Eligibility criteria entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `eligibility_criteria` table.
///
/// Rows are append-only: replacing criteria stamps `superseded_at` on
/// the old row and inserts a new one. `jurisdiction` may be `'*'`,
/// matching any jurisdiction at lower priority than an exact match.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EligibilityCriteria {
    pub id: DbId,
    pub tenant_id: String,
    pub fund_structure_id: DbId,
    pub jurisdiction: String,
    pub investor_type: String,
    pub minimum_investment_cents: i64,
    pub maximum_allocation_pct: Option<f64>,
    pub documentation_required: serde_json::Value,
    pub suitability_required: bool,
    pub source_reference: Option<String>,
    pub effective_date: NaiveDate,
    pub superseded_at: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating eligibility criteria.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEligibilityCriteria {
    pub jurisdiction: String,
    pub investor_type: String,
    #[serde(default)]
    pub minimum_investment_cents: i64,
    pub maximum_allocation_pct: Option<f64>,
    #[serde(default)]
    pub documentation_required: Vec<String>,
    #[serde(default)]
    pub suitability_required: bool,
    pub source_reference: Option<String>,
    pub effective_date: NaiveDate,
}
