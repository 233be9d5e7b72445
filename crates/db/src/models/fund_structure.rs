//! Fund structure entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `fund_structures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FundStructure {
    pub id: DbId,
    pub tenant_id: String,
    pub name: String,
    pub legal_form: String,
    pub domicile: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new fund structure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFundStructure {
    pub name: String,
    pub legal_form: String,
    pub domicile: String,
    /// Defaults to `'active'` if omitted.
    pub status: Option<String>,
}

/// DTO for updating an existing fund structure. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFundStructure {
    pub name: Option<String>,
    pub legal_form: Option<String>,
    pub domicile: Option<String>,
    pub status: Option<String>,
}
