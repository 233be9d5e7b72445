//! Repository for the `users` table.

use sqlx::PgPool;

use registra_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, tenant_id, email, password_hash, display_name, role, created_at, updated_at";

/// Provides account lookup and creation.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// If `role` is `None`, defaults to `'officer'`.
    pub async fn create(
        pool: &PgPool,
        tenant_id: &str,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (tenant_id, email, password_hash, display_name, role)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'officer'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(tenant_id)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: &str,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE tenant_id = $1 AND id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email within a tenant. Used by login.
    pub async fn find_by_email(
        pool: &PgPool,
        tenant_id: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE tenant_id = $1 AND email = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(tenant_id)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
