//! Transfer entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use registra_core::types::{DbId, Timestamp};

/// A row from the `transfers` table.
///
/// `status` is one of `executed`, `pending_approval` or `rejected`;
/// `decision_record_id` links to the immutable record of the validation
/// that produced this row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transfer {
    pub id: DbId,
    pub tenant_id: String,
    pub asset_id: DbId,
    pub from_investor_id: DbId,
    pub to_investor_id: DbId,
    pub units: i64,
    pub execution_date: Timestamp,
    pub status: String,
    pub pending_reason: Option<String>,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub decision_record_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for requesting a transfer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransfer {
    pub asset_id: DbId,
    pub from_investor_id: DbId,
    pub to_investor_id: DbId,
    pub units: i64,
    /// Defaults to now if omitted.
    pub execution_date: Option<Timestamp>,
}
