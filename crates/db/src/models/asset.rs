//! Asset entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub tenant_id: String,
    pub fund_structure_id: Option<DbId>,
    pub name: String,
    pub symbol: String,
    pub total_units: i64,
    pub unit_price_cents: i64,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new asset.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub fund_structure_id: Option<DbId>,
    pub name: String,
    pub symbol: String,
    pub total_units: i64,
    pub unit_price_cents: i64,
    /// Defaults to `'EUR'` if omitted.
    pub currency: Option<String>,
}

/// DTO for updating an existing asset. All fields are optional.
///
/// `total_units` is intentionally not updatable; the issued supply is
/// fixed at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAsset {
    pub fund_structure_id: Option<DbId>,
    pub name: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub currency: Option<String>,
}
