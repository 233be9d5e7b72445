//! Holding entity model (units of an asset held by an investor).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `holdings` table.
///
/// One row per (asset, investor) pair; `acquired_at` resets whenever an
/// incoming transfer tops the position up from zero.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Holding {
    pub id: DbId,
    pub tenant_id: String,
    pub asset_id: DbId,
    pub investor_id: DbId,
    pub units: i64,
    pub acquired_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an initial allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHolding {
    pub asset_id: DbId,
    pub investor_id: DbId,
    pub units: i64,
    pub acquired_at: Option<Timestamp>,
}
