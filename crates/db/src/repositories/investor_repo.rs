//! Repository for the `investors` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::investor::{CreateInvestor, Investor, UpdateInvestor, UpdateKyc};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, name, email, tax_id, lei, jurisdiction, investor_type, \
    accredited, kyc_status, kyc_verified_at, kyc_expiry, classification_method, \
    classification_date, classification_evidence, created_at, updated_at";

/// Provides CRUD operations for investors.
pub struct InvestorRepo;

impl InvestorRepo {
    /// Insert a new investor, returning the created row.
    ///
    /// KYC starts as `'pending'`; `accredited` defaults to false.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateInvestor,
    ) -> Result<Investor, sqlx::Error> {
        let query = format!(
            "INSERT INTO investors
                (tenant_id, name, email, tax_id, lei, jurisdiction, investor_type, accredited,
                 classification_method, classification_date, classification_evidence)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, FALSE),
                     $9, $10, COALESCE($11, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Investor>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.tax_id)
            .bind(&input.lei)
            .bind(&input.jurisdiction)
            .bind(&input.investor_type)
            .bind(input.accredited)
            .bind(&input.classification_method)
            .bind(input.classification_date)
            .bind(&input.classification_evidence)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<Investor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM investors WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, Investor>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List investors for a tenant, newest first.
    pub async fn list(
        pool: &PgPool,
        tenant_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Investor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM investors WHERE tenant_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Investor>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an investor. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
        input: &UpdateInvestor,
    ) -> Result<Option<Investor>, sqlx::Error> {
        let query = format!(
            "UPDATE investors SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                tax_id = COALESCE($5, tax_id),
                lei = COALESCE($6, lei),
                jurisdiction = COALESCE($7, jurisdiction),
                investor_type = COALESCE($8, investor_type),
                accredited = COALESCE($9, accredited),
                classification_method = COALESCE($10, classification_method),
                classification_date = COALESCE($11, classification_date),
                classification_evidence = COALESCE($12, classification_evidence),
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Investor>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.tax_id)
            .bind(&input.lei)
            .bind(&input.jurisdiction)
            .bind(&input.investor_type)
            .bind(input.accredited)
            .bind(&input.classification_method)
            .bind(input.classification_date)
            .bind(&input.classification_evidence)
            .fetch_optional(pool)
            .await
    }

    /// Record a KYC status change.
    ///
    /// `kyc_verified_at` is stamped when the new status is `'verified'`,
    /// cleared otherwise.
    pub async fn update_kyc(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
        input: &UpdateKyc,
    ) -> Result<Option<Investor>, sqlx::Error> {
        let query = format!(
            "UPDATE investors SET
                kyc_status = $3,
                kyc_verified_at = CASE WHEN $3 = 'verified' THEN NOW() ELSE NULL END,
                kyc_expiry = $4,
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Investor>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(&input.kyc_status)
            .bind(input.kyc_expiry)
            .fetch_optional(pool)
            .await
    }

    /// Delete an investor. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while holdings or transfers
    /// reference the investor.
    pub async fn delete(pool: &PgPool, tenant_id: &str, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM investors WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
