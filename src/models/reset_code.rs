use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Length of a password-reset code, in ASCII digits.
pub const CODE_LENGTH: usize = 5;

/// How many verification attempts a freshly issued code allows.
pub const MAX_ATTEMPTS: i16 = 5;

/// How long an issued code stays valid.
pub const CODE_TTL_MINUTES: i64 = 5;

/// A password-reset code. Each user owns at most one record at a time; issuing
/// a new code replaces the record wholesale.
///
/// `expires_at` is fixed at write time as `created_at + CODE_TTL_MINUTES` and
/// never recomputed. `attempts_remaining` only decreases until the next issue.
#[derive(Debug, Clone, FromRow)]
pub struct ResetCode {
    pub user_id: i32,
    pub code: String,
    pub attempts_remaining: i16,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResetCode {
    /// Builds a fresh record for `user_id` with a full attempt budget and the
    /// expiry pinned to the creation instant.
    pub fn issue(user_id: i32, code: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            code: code.to_string(),
            attempts_remaining: MAX_ATTEMPTS,
            created_at: now,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
        }
    }

    /// Whether the code has passed its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_pins_expiry_to_creation() {
        let record = ResetCode::issue(7, "54321");

        assert_eq!(record.user_id, 7);
        assert_eq!(record.code, "54321");
        assert_eq!(record.attempts_remaining, MAX_ATTEMPTS);
        assert_eq!(
            record.expires_at,
            record.created_at + Duration::minutes(CODE_TTL_MINUTES)
        );
    }

    #[test]
    fn test_expiry_check() {
        let record = ResetCode::issue(7, "54321");

        assert!(!record.is_expired_at(record.created_at));
        assert!(!record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::seconds(1)));
    }
}
