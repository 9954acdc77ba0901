use sqlx::PgPool;

use crate::auth::hash_password;
use crate::error::AppError;

/// A user account as the reset lifecycle sees it: just enough to address a
/// code and rewrite a credential.
#[derive(Debug, Clone)]
pub struct AccountRef {
    pub id: i32,
    pub email: String,
}

/// The identity/credential seam the reset lifecycle consumes.
///
/// Hashing lives behind this trait — the lifecycle hands over the plaintext
/// replacement password and the store decides how credentials are kept.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRef>, AppError>;

    /// Replaces the account's password.
    async fn set_password(&self, user_id: i32, new_password: &str) -> Result<(), AppError>;

    /// Deletes the account's recorded auth token if one exists. Returns
    /// whether a token was present; absence is not an error.
    async fn revoke_token(&self, user_id: i32) -> Result<bool, AppError>;
}

/// PostgreSQL-backed credential store over `users` and `auth_tokens`.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRef>, AppError> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, email FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, email)| AccountRef { id, email }))
    }

    async fn set_password(&self, user_id: i32, new_password: &str) -> Result<(), AppError> {
        let password_hash = hash_password(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }

    async fn revoke_token(&self, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
