//! Repository for the `assets` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::asset::{Asset, CreateAsset, UpdateAsset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, fund_structure_id, name, symbol, total_units, \
    unit_price_cents, currency, created_at, updated_at";

/// Provides CRUD operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset, returning the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateAsset,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets
                (tenant_id, fund_structure_id, name, symbol, total_units,
                 unit_price_cents, currency)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'EUR'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(tenant_id)
            .bind(input.fund_structure_id)
            .bind(&input.name)
            .bind(&input.symbol)
            .bind(input.total_units)
            .bind(input.unit_price_cents)
            .bind(&input.currency)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, Asset>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assets for a tenant, ordered by symbol.
    pub async fn list(pool: &PgPool, tenant_id: &str) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE tenant_id = $1 ORDER BY symbol");
        sqlx::query_as::<_, Asset>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Update an asset. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET
                fund_structure_id = COALESCE($3, fund_structure_id),
                name = COALESCE($4, name),
                unit_price_cents = COALESCE($5, unit_price_cents),
                currency = COALESCE($6, currency),
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(input.fund_structure_id)
            .bind(&input.name)
            .bind(input.unit_price_cents)
            .bind(&input.currency)
            .fetch_optional(pool)
            .await
    }
}
