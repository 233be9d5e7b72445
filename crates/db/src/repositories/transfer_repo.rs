//! Repository for the `transfers` table.

use sqlx::{PgConnection, PgPool};

use registra_core::types::{DbId, Timestamp};

use crate::models::transfer::Transfer;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, asset_id, from_investor_id, to_investor_id, units, \
    execution_date, status, pending_reason, approved_by, approved_at, \
    decision_record_id, created_at, updated_at";

/// Provides insert and lifecycle operations for transfers.
pub struct TransferRepo;

impl TransferRepo {
    /// Insert a transfer row inside the execution transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        tenant_id: &str,
        asset_id: DbId,
        from_investor_id: DbId,
        to_investor_id: DbId,
        units: i64,
        execution_date: Timestamp,
        status: &str,
        pending_reason: Option<&str>,
        decision_record_id: Option<DbId>,
    ) -> Result<Transfer, sqlx::Error> {
        let query = format!(
            "INSERT INTO transfers
                (tenant_id, asset_id, from_investor_id, to_investor_id, units,
                 execution_date, status, pending_reason, decision_record_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(from_investor_id)
            .bind(to_investor_id)
            .bind(units)
            .bind(execution_date)
            .bind(status)
            .bind(pending_reason)
            .bind(decision_record_id)
            .fetch_one(conn)
            .await
    }

    /// Attach the decision record documenting this transfer's validation.
    ///
    /// Runs inside the execution transaction, after the record row has
    /// been appended (the record needs the transfer id as its subject).
    pub async fn link_decision(
        conn: &mut PgConnection,
        tenant_id: &str,
        id: DbId,
        decision_record_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE transfers SET decision_record_id = $3, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .bind(decision_record_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfers WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a pending transfer row for approval or rejection.
    pub async fn find_locked(
        conn: &mut PgConnection,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM transfers WHERE tenant_id = $1 AND id = $2 FOR UPDATE");
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List transfers touching an asset, newest first.
    pub async fn list_by_asset(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers
             WHERE tenant_id = $1 AND asset_id = $2
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List transfers awaiting manual approval, oldest first.
    pub async fn list_pending(
        pool: &PgPool,
        tenant_id: &str,
    ) -> Result<Vec<Transfer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transfers
             WHERE tenant_id = $1 AND status = 'pending_approval'
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Move a transfer out of `pending_approval` inside the settlement
    /// transaction, stamping the reviewer.
    pub async fn settle(
        conn: &mut PgConnection,
        tenant_id: &str,
        id: DbId,
        status: &str,
        approved_by: DbId,
    ) -> Result<Transfer, sqlx::Error> {
        let query = format!(
            "UPDATE transfers SET
                status = $3, approved_by = $4, approved_at = NOW(), updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transfer>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(status)
            .bind(approved_by)
            .fetch_one(conn)
            .await
    }
}
