//! Repository for the `users` table.

use aquasurvey_core::roles::ROLE_SURVEYOR;
use aquasurvey_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users holding `role`, ordered by name.
    pub async fn list_by_role(pool: &PgPool, role: &str) -> Result<Vec<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// Count users holding `role`.
    pub async fn count_by_role(pool: &PgPool, role: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete a surveyor and, through `ON DELETE CASCADE`, every survey they own.
    ///
    /// Returns the number of surveys removed, or `None` if no user with the
    /// given id holds the surveyor role.
    pub async fn delete_surveyor(pool: &PgPool, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 AND role = $2 FOR UPDATE")
                .bind(id)
                .bind(ROLE_SURVEYOR)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let (survey_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM surveys WHERE user_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(survey_count))
    }
}
