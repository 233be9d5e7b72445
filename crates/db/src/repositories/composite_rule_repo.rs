//! Repository for the `composite_rules` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::composite_rule::{CompositeRule, CreateCompositeRule, UpdateCompositeRule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, asset_id, name, description, operator, conditions, \
    enabled, severity, jurisdiction, created_at, updated_at";

/// Provides CRUD operations for composite rules.
pub struct CompositeRuleRepo;

impl CompositeRuleRepo {
    /// Insert a new composite rule, returning the created row.
    ///
    /// Callers validate `operator` and `conditions` against the rule
    /// engine before inserting; this layer only persists.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
        input: &CreateCompositeRule,
    ) -> Result<CompositeRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO composite_rules
                (tenant_id, asset_id, name, description, operator, conditions,
                 enabled, severity, jurisdiction)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'medium'), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompositeRule>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.operator)
            .bind(&input.conditions)
            .bind(input.enabled)
            .bind(&input.severity)
            .bind(&input.jurisdiction)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<CompositeRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM composite_rules WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, CompositeRule>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all composite rules for an asset, ordered by name.
    pub async fn list_by_asset(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<Vec<CompositeRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM composite_rules
             WHERE tenant_id = $1 AND asset_id = $2
             ORDER BY name"
        );
        sqlx::query_as::<_, CompositeRule>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// List only the enabled rules for an asset, as used by evaluation.
    pub async fn list_enabled(
        pool: &PgPool,
        tenant_id: &str,
        asset_id: DbId,
    ) -> Result<Vec<CompositeRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM composite_rules
             WHERE tenant_id = $1 AND asset_id = $2 AND enabled = TRUE
             ORDER BY name"
        );
        sqlx::query_as::<_, CompositeRule>(&query)
            .bind(tenant_id)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Update a composite rule. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
        input: &UpdateCompositeRule,
    ) -> Result<Option<CompositeRule>, sqlx::Error> {
        let query = format!(
            "UPDATE composite_rules SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                operator = COALESCE($5, operator),
                conditions = COALESCE($6, conditions),
                enabled = COALESCE($7, enabled),
                severity = COALESCE($8, severity),
                jurisdiction = COALESCE($9, jurisdiction),
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompositeRule>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.operator)
            .bind(&input.conditions)
            .bind(input.enabled)
            .bind(&input.severity)
            .bind(&input.jurisdiction)
            .fetch_optional(pool)
            .await
    }

    /// Delete a composite rule. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM composite_rules WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
