//! Repository for the `eligibility_criteria` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::eligibility_criteria::{CreateEligibilityCriteria, EligibilityCriteria};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, fund_structure_id, jurisdiction, investor_type, \
    minimum_investment_cents, maximum_allocation_pct, documentation_required, \
    suitability_required, source_reference, effective_date, superseded_at, \
    created_at, updated_at";

/// Provides append-only criteria operations.
pub struct EligibilityCriteriaRepo;

impl EligibilityCriteriaRepo {
    /// Insert new criteria, superseding any active row for the same
    /// (fund, jurisdiction, investor type) as of the new effective date.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        fund_structure_id: DbId,
        input: &CreateEligibilityCriteria,
    ) -> Result<EligibilityCriteria, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE eligibility_criteria
             SET superseded_at = $5, updated_at = NOW()
             WHERE tenant_id = $1 AND fund_structure_id = $2
               AND jurisdiction = $3 AND investor_type = $4
               AND superseded_at IS NULL",
        )
        .bind(tenant_id)
        .bind(fund_structure_id)
        .bind(&input.jurisdiction)
        .bind(&input.investor_type)
        .bind(input.effective_date)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO eligibility_criteria
                (tenant_id, fund_structure_id, jurisdiction, investor_type,
                 minimum_investment_cents, maximum_allocation_pct,
                 documentation_required, suitability_required, source_reference,
                 effective_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, EligibilityCriteria>(&query)
            .bind(tenant_id)
            .bind(fund_structure_id)
            .bind(&input.jurisdiction)
            .bind(&input.investor_type)
            .bind(input.minimum_investment_cents)
            .bind(input.maximum_allocation_pct)
            .bind(serde_json::json!(input.documentation_required))
            .bind(input.suitability_required)
            .bind(&input.source_reference)
            .bind(input.effective_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// List all criteria rows for a fund, including superseded history.
    pub async fn list_by_fund(
        pool: &PgPool,
        tenant_id: &str,
        fund_structure_id: DbId,
    ) -> Result<Vec<EligibilityCriteria>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM eligibility_criteria
             WHERE tenant_id = $1 AND fund_structure_id = $2
             ORDER BY jurisdiction, investor_type, effective_date DESC"
        );
        sqlx::query_as::<_, EligibilityCriteria>(&query)
            .bind(tenant_id)
            .bind(fund_structure_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve the applicable criteria for an investor profile.
    ///
    /// Exact jurisdiction match outranks the `'*'` wildcard; rows must
    /// already be effective and not superseded; ties go to the most
    /// recent effective date. Mirrors
    /// `registra_core::eligibility::select_applicable_criteria`.
    pub async fn find_applicable(
        pool: &PgPool,
        tenant_id: &str,
        fund_structure_id: DbId,
        jurisdiction: &str,
        investor_type: &str,
        as_of: NaiveDate,
    ) -> Result<Option<EligibilityCriteria>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM eligibility_criteria
             WHERE tenant_id = $1 AND fund_structure_id = $2
               AND investor_type = $3
               AND (jurisdiction = $4 OR jurisdiction = '*')
               AND effective_date <= $5
               AND superseded_at IS NULL
             ORDER BY (jurisdiction = $4) DESC, effective_date DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, EligibilityCriteria>(&query)
            .bind(tenant_id)
            .bind(fund_structure_id)
            .bind(investor_type)
            .bind(jurisdiction)
            .bind(as_of)
            .fetch_optional(pool)
            .await
    }
}
