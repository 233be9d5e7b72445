//! Repository for the `onboarding_records` table.

use sqlx::{PgConnection, PgPool};

use registra_core::types::DbId;

use crate::models::onboarding::{CreateOnboarding, OnboardingRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, investor_id, fund_structure_id, asset_id, status, \
    investment_amount_cents, notes, decided_by, decision_record_id, \
    created_at, updated_at";

/// Provides operations for onboarding applications.
pub struct OnboardingRepo;

impl OnboardingRepo {
    /// Insert a new application in the `'applied'` state.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateOnboarding,
    ) -> Result<OnboardingRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_records
                (tenant_id, investor_id, fund_structure_id, asset_id,
                 investment_amount_cents, notes)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(tenant_id)
            .bind(input.investor_id)
            .bind(input.fund_structure_id)
            .bind(input.asset_id)
            .bind(input.investment_amount_cents)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM onboarding_records WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List applications, optionally filtered by status, newest first.
    pub async fn list(
        pool: &PgPool,
        tenant_id: &str,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_records
             WHERE tenant_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(tenant_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move an application to a new status.
    ///
    /// The guard on the current status makes a lost transition race
    /// surface as `None` instead of a silent double-write.
    #[allow(clippy::too_many_arguments)]
    pub async fn transition(
        conn: &mut PgConnection,
        tenant_id: &str,
        id: DbId,
        from_status: &str,
        to_status: &str,
        decided_by: Option<DbId>,
        decision_record_id: Option<DbId>,
        notes: Option<&str>,
    ) -> Result<Option<OnboardingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_records SET
                status = $4,
                decided_by = COALESCE($5, decided_by),
                decision_record_id = COALESCE($6, decision_record_id),
                notes = COALESCE($7, notes),
                updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRecord>(&query)
            .bind(tenant_id)
            .bind(id)
            .bind(from_status)
            .bind(to_status)
            .bind(decided_by)
            .bind(decision_record_id)
            .bind(notes)
            .fetch_optional(conn)
            .await
    }
}
