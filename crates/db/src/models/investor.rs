//! Investor entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `investors` table.
///
/// `investor_type` and `kyc_status` are stored as their snake_case
/// string forms; parse with the enums in `registra_core::investor` when
/// evaluating rules.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Investor {
    pub id: DbId,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub tax_id: Option<String>,
    pub lei: Option<String>,
    pub jurisdiction: String,
    pub investor_type: String,
    pub accredited: bool,
    pub kyc_status: String,
    pub kyc_verified_at: Option<Timestamp>,
    pub kyc_expiry: Option<Timestamp>,
    pub classification_method: Option<String>,
    pub classification_date: Option<chrono::NaiveDate>,
    /// JSON array of classification evidence documents.
    pub classification_evidence: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new investor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvestor {
    pub name: String,
    pub email: String,
    pub tax_id: Option<String>,
    pub lei: Option<String>,
    pub jurisdiction: String,
    pub investor_type: String,
    pub accredited: Option<bool>,
    pub classification_method: Option<String>,
    pub classification_date: Option<chrono::NaiveDate>,
    pub classification_evidence: Option<serde_json::Value>,
}

/// DTO for updating an existing investor. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInvestor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub lei: Option<String>,
    pub jurisdiction: Option<String>,
    pub investor_type: Option<String>,
    pub accredited: Option<bool>,
    pub classification_method: Option<String>,
    pub classification_date: Option<chrono::NaiveDate>,
    pub classification_evidence: Option<serde_json::Value>,
}

/// DTO for recording a KYC status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKyc {
    pub kyc_status: String,
    pub kyc_expiry: Option<Timestamp>,
}
