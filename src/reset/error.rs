//! Typed failure taxonomy of the password-reset lifecycle.
//!
//! Every outcome a caller can observe from `ResetService` is one of these
//! variants; the HTTP layer converts them into `AppError` responses. Attempts
//! exhaustion is the one rate-limit-class failure and maps to 429, the rest of
//! the domain failures are client errors (400), and `Repository` carries
//! whatever the storage layer reported.

use std::fmt;

use crate::error::AppError;

#[derive(Debug)]
pub enum ResetError {
    /// No account exists for the submitted email address.
    UserNotFound,
    /// Verification was attempted while the user has no pending reset code.
    NoResetInProgress,
    /// The submitted code does not match the stored one. The attempt has
    /// already been consumed by the time this is reported.
    WrongCode,
    /// The code matched but its expiry instant has passed. The attempt has
    /// already been consumed.
    CodeExpired,
    /// The code's attempt budget is spent; only issuing a new code helps.
    AttemptsExhausted,
    /// `new_password` and `confirm_password` differ.
    PasswordMismatch,
    /// Consumption found no stored record matching the exact (user, code)
    /// pair.
    NoMatchingCode,
    /// A storage or credential-store failure unrelated to the protocol.
    Repository(AppError),
}

impl fmt::Display for ResetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResetError::UserNotFound => write!(f, "No user with this email"),
            ResetError::NoResetInProgress => write!(f, "No password reset in progress"),
            ResetError::WrongCode => write!(f, "Wrong code"),
            ResetError::CodeExpired => write!(f, "Code has expired"),
            ResetError::AttemptsExhausted => write!(f, "Too many attempts, request a new code"),
            ResetError::PasswordMismatch => write!(f, "Passwords do not match"),
            ResetError::NoMatchingCode => write!(f, "No matching code for this user"),
            ResetError::Repository(err) => write!(f, "{}", err),
        }
    }
}

impl From<AppError> for ResetError {
    fn from(error: AppError) -> ResetError {
        ResetError::Repository(error)
    }
}

/// Maps lifecycle failures onto HTTP-facing errors: 429 for exhaustion,
/// 400 for every other protocol failure, and pass-through for repository
/// errors.
impl From<ResetError> for AppError {
    fn from(error: ResetError) -> AppError {
        match error {
            ResetError::AttemptsExhausted => AppError::TooManyRequests(error.to_string()),
            ResetError::Repository(err) => err,
            _ => AppError::BadRequest(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ResponseError;

    #[test]
    fn test_http_mapping() {
        let cases = [
            (ResetError::UserNotFound, 400),
            (ResetError::NoResetInProgress, 400),
            (ResetError::WrongCode, 400),
            (ResetError::CodeExpired, 400),
            (ResetError::AttemptsExhausted, 429),
            (ResetError::PasswordMismatch, 400),
            (ResetError::NoMatchingCode, 400),
        ];

        for (error, expected_status) in cases {
            let app_error = AppError::from(error);
            assert_eq!(app_error.error_response().status(), expected_status);
        }
    }

    #[test]
    fn test_repository_errors_pass_through() {
        let inner = AppError::DatabaseError("connection lost".into());
        let app_error = AppError::from(ResetError::Repository(inner));
        assert_eq!(app_error.error_response().status(), 500);
    }
}
