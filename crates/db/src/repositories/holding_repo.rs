//! Repository for the `holdings` table.
//!
//! Transfer execution mutates holdings inside a transaction; the
//! `*_locked` methods take `&mut PgConnection` so they can run against
//! that transaction and use `SELECT ... FOR UPDATE` row locks.

use sqlx::{PgConnection, PgPool};

use registra_core::types::{DbId, Timestamp};

use crate::models::holding::{CreateHolding, Holding};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, tenant_id, asset_id, investor_id, units, acquired_at, created_at, updated_at";

/// Provides read and balance-adjustment operations for holdings.
pub struct HoldingRepo;

impl HoldingRepo {
    /// Insert an initial allocation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateHolding,
    ) -> Result<Holding, sqlx::Error> {
        let query = format!(
            "INSERT INTO holdings (tenant_id, asset_id, investor_id, units, acquired_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(input.asset_id)
            .bind(input.investor_id)
            .bind(input.units)
            .bind(input.acquired_at)
            .fetch_one(pool)
            .await
    }

    /// Find the holding of one investor in one asset.
    pub async fn find(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
        investor_id: DbId,
    ) -> Result<Option<Holding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holdings
             WHERE tenant_id = $1 AND asset_id = $2 AND investor_id = $3"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(investor_id)
            .fetch_optional(pool)
            .await
    }

    /// List all positions in an asset with a positive balance.
    pub async fn list_by_asset(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<Vec<Holding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holdings
             WHERE tenant_id = $1 AND asset_id = $2 AND units > 0
             ORDER BY units DESC"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// List all positions of an investor with a positive balance.
    pub async fn list_by_investor(
        pool: &PgPool,
        tenant_id: &str,
        investor_id: DbId,
    ) -> Result<Vec<Holding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holdings
             WHERE tenant_id = $1 AND investor_id = $2 AND units > 0
             ORDER BY asset_id"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(investor_id)
            .fetch_all(pool)
            .await
    }

    /// Count distinct investors holding a positive balance in an asset.
    pub async fn count_holders(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM holdings
             WHERE tenant_id = $1 AND asset_id = $2 AND units > 0",
        )
        .bind(tenant_id)
        .bind(asset_id)
        .fetch_one(pool)
        .await
    }

    /// Lock and fetch a holding row for the duration of the transaction.
    pub async fn find_locked(
        conn: &mut PgConnection,
        tenant_id: &str,
        asset_id: DbId,
        investor_id: DbId,
    ) -> Result<Option<Holding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holdings
             WHERE tenant_id = $1 AND asset_id = $2 AND investor_id = $3
             FOR UPDATE"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(investor_id)
            .fetch_optional(conn)
            .await
    }

    /// Subtract units from a locked sender position.
    ///
    /// The guard `units >= $4` makes an insufficient balance surface as
    /// zero rows affected rather than a negative position.
    pub async fn debit_locked(
        conn: &mut PgConnection,
        tenant_id: &str,
        asset_id: DbId,
        investor_id: DbId,
        units: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE holdings SET units = units - $4, updated_at = NOW()
             WHERE tenant_id = $1 AND asset_id = $2 AND investor_id = $3 AND units >= $4",
        )
        .bind(tenant_id)
        .bind(asset_id)
        .bind(investor_id)
        .bind(units)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add units to a receiver position, creating the row if absent.
    ///
    /// A position topped up from zero restarts its lockup clock, so
    /// `acquired_at` is refreshed in that case.
    pub async fn credit_locked(
        conn: &mut PgConnection,
        tenant_id: &str,
        asset_id: DbId,
        investor_id: DbId,
        units: i64,
        acquired_at: Timestamp,
    ) -> Result<Holding, sqlx::Error> {
        let query = format!(
            "INSERT INTO holdings (tenant_id, asset_id, investor_id, units, acquired_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_holdings_asset_investor DO UPDATE SET
                units = holdings.units + EXCLUDED.units,
                acquired_at = CASE WHEN holdings.units = 0
                    THEN EXCLUDED.acquired_at ELSE holdings.acquired_at END,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holding>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(investor_id)
            .bind(units)
            .bind(acquired_at)
            .fetch_one(conn)
            .await
    }
}
