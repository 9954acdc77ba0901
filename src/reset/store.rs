use sqlx::PgPool;

use crate::error::AppError;
use crate::models::reset_code::ResetCode;

/// Persistence contract for the one-reset-code-per-user record.
///
/// The lifecycle is written against this trait so it can be exercised without
/// a database; `PgResetCodeStore` is the production implementation and the
/// lifecycle tests carry an in-memory one.
#[allow(async_fn_in_trait)]
pub trait ResetCodeStore {
    /// Fetches the user's pending record, if any.
    async fn get(&self, user_id: i32) -> Result<Option<ResetCode>, AppError>;

    /// Replace-or-create: the new code is stored with a full attempt budget
    /// and freshly pinned timestamps, regardless of what was there before
    /// (last writer wins).
    async fn upsert(&self, user_id: i32, code: &str) -> Result<ResetCode, AppError>;

    /// Atomically spends one attempt and returns the updated record.
    ///
    /// Returns `None` when there is nothing to decrement — no record, or a
    /// record already at zero. The guard and the decrement are a single
    /// statement so concurrent attempts for the same user serialize in the
    /// store and the counter can neither under-count nor go negative.
    async fn decrement_attempts(&self, user_id: i32) -> Result<Option<ResetCode>, AppError>;

    /// Deletes the record only if the stored code matches exactly. Returns
    /// whether a record was deleted.
    async fn delete_by_code(&self, user_id: i32, code: &str) -> Result<bool, AppError>;
}

/// PostgreSQL-backed store over the `reset_codes` table.
#[derive(Clone)]
pub struct PgResetCodeStore {
    pool: PgPool,
}

impl PgResetCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ResetCodeStore for PgResetCodeStore {
    async fn get(&self, user_id: i32) -> Result<Option<ResetCode>, AppError> {
        let record = sqlx::query_as::<_, ResetCode>(
            "SELECT user_id, code, attempts_remaining, created_at, expires_at
             FROM reset_codes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert(&self, user_id: i32, code: &str) -> Result<ResetCode, AppError> {
        // Timestamps are computed here rather than in SQL so that
        // expires_at is exactly created_at + TTL, by construction.
        let issued = ResetCode::issue(user_id, code);

        let record = sqlx::query_as::<_, ResetCode>(
            "INSERT INTO reset_codes (user_id, code, attempts_remaining, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE
                 SET code = EXCLUDED.code,
                     attempts_remaining = EXCLUDED.attempts_remaining,
                     created_at = EXCLUDED.created_at,
                     expires_at = EXCLUDED.expires_at
             RETURNING user_id, code, attempts_remaining, created_at, expires_at",
        )
        .bind(issued.user_id)
        .bind(&issued.code)
        .bind(issued.attempts_remaining)
        .bind(issued.created_at)
        .bind(issued.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn decrement_attempts(&self, user_id: i32) -> Result<Option<ResetCode>, AppError> {
        let record = sqlx::query_as::<_, ResetCode>(
            "UPDATE reset_codes
             SET attempts_remaining = attempts_remaining - 1
             WHERE user_id = $1 AND attempts_remaining > 0
             RETURNING user_id, code, attempts_remaining, created_at, expires_at",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_by_code(&self, user_id: i32, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reset_codes WHERE user_id = $1 AND code = $2")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
