//! Repository for the `rule_sets` table.
//!
//! Rule sets are versioned append-only. Publishing a new version closes
//! the previous one by stamping `superseded_at`, inside a transaction so
//! there is never more than one active version per asset. Historical
//! versions stay queryable for decision record audits.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::rule_set::{CreateRuleSet, RuleSet};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, asset_id, version, qualification_required, lockup_days, \
    jurisdiction_whitelist, transfer_whitelist, investor_type_whitelist, \
    minimum_investment_cents, maximum_investors, concentration_limit_pct, \
    kyc_required, approval_threshold_units, created_by, superseded_at, \
    created_at, updated_at";

/// Provides versioned rule-set operations.
pub struct RuleSetRepo;

impl RuleSetRepo {
    /// Publish a new rule-set version for an asset.
    ///
    /// Supersedes the current active version (if any) and inserts the
    /// next version number in one transaction.
    pub async fn publish(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
        input: &CreateRuleSet,
        created_by: Option<DbId>,
    ) -> Result<RuleSet, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<i32> = sqlx::query_scalar(
            "UPDATE rule_sets SET superseded_at = NOW(), updated_at = NOW()
             WHERE tenant_id = $1 AND asset_id = $2 AND superseded_at IS NULL
             RETURNING version",
        )
        .bind(tenant_id)
        .bind(asset_id)
        .fetch_optional(&mut *tx)
        .await?;

        let version = previous.unwrap_or(0) + 1;

        let query = format!(
            "INSERT INTO rule_sets
                (tenant_id, asset_id, version, qualification_required, lockup_days,
                 jurisdiction_whitelist, transfer_whitelist, investor_type_whitelist,
                 minimum_investment_cents, maximum_investors, concentration_limit_pct,
                 kyc_required, approval_threshold_units, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, RuleSet>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(version)
            .bind(input.qualification_required)
            .bind(input.lockup_days)
            .bind(serde_json::json!(input.jurisdiction_whitelist))
            .bind(input.transfer_whitelist.as_ref().map(|w| serde_json::json!(w)))
            .bind(input.investor_type_whitelist.as_ref().map(|w| serde_json::json!(w)))
            .bind(input.minimum_investment_cents)
            .bind(input.maximum_investors)
            .bind(input.concentration_limit_pct)
            .bind(input.kyc_required)
            .bind(input.approval_threshold_units)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Find the active rule set for an asset, if one has been published.
    pub async fn find_active(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<Option<RuleSet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_sets
             WHERE tenant_id = $1 AND asset_id = $2 AND superseded_at IS NULL"
        );
        sqlx::query_as::<_, RuleSet>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a specific historical version.
    pub async fn find_version(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
        version: i32,
    ) -> Result<Option<RuleSet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_sets
             WHERE tenant_id = $1 AND asset_id = $2 AND version = $3"
        );
        sqlx::query_as::<_, RuleSet>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// List all versions for an asset, in creation order.
    pub async fn list_versions(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<Vec<RuleSet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rule_sets
             WHERE tenant_id = $1 AND asset_id = $2
             ORDER BY version ASC"
        );
        sqlx::query_as::<_, RuleSet>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }
}
