//! Repository for the `fund_structures` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::fund_structure::{CreateFundStructure, FundStructure, UpdateFundStructure};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, tenant_id, name, legal_form, domicile, status, created_at, updated_at";

/// Provides CRUD operations for fund structures.
pub struct FundStructureRepo;

impl FundStructureRepo {
    /// Insert a new fund structure, returning the created row.
    ///
    /// If `status` is `None`, defaults to `'active'`.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateFundStructure,
    ) -> Result<FundStructure, sqlx::Error> {
        let query = format!(
            "INSERT INTO fund_structures (tenant_id, name, legal_form, domicile, status)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'active'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundStructure>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.legal_form)
            .bind(&input.domicile)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<FundStructure>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM fund_structures WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, FundStructure>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List fund structures for a tenant, ordered by name.
    pub async fn list(pool: &PgPool, tenant_id: &str) -> Result<Vec<FundStructure>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM fund_structures WHERE tenant_id = $1 ORDER BY name");
        sqlx::query_as::<_, FundStructure>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Update a fund structure. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
        input: &UpdateFundStructure,
    ) -> Result<Option<FundStructure>, sqlx::Error> {
        let query = format!(
            "UPDATE fund_structures SET
                name = COALESCE($3, name),
                legal_form = COALESCE($4, legal_form),
                domicile = COALESCE($5, domicile),
                status = COALESCE($6, status),
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundStructure>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(&input.name)
            .bind(&input.legal_form)
            .bind(&input.domicile)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }
}
