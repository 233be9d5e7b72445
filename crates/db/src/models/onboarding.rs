//! Onboarding application entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `onboarding_records` table.
///
/// `status` follows the workflow in `registra_core::onboarding`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingRecord {
    pub id: DbId,
    pub tenant_id: String,
    pub investor_id: DbId,
    pub fund_structure_id: DbId,
    pub asset_id: Option<DbId>,
    pub status: String,
    pub investment_amount_cents: Option<i64>,
    pub notes: Option<String>,
    pub decided_by: Option<DbId>,
    pub decision_record_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting an onboarding application.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOnboarding {
    pub investor_id: DbId,
    pub fund_structure_id: DbId,
    pub asset_id: Option<DbId>,
    pub investment_amount_cents: Option<i64>,
    pub notes: Option<String>,
}
