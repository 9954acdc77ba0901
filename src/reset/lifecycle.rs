//! The password-reset state machine.
//!
//! Per user the protocol moves through `NO_CODE → CODE_ACTIVE →
//! (CODE_CONSUMED | CODE_EXPIRED | ATTEMPTS_EXHAUSTED)`. Issuing replaces
//! whatever was pending; verification and consumption spend attempts;
//! consumption is terminal and leaves no residual state. Expiry is checked
//! lazily — there is no sweep, stale records sit in storage until the next
//! issue overwrites them.

use chrono::Utc;

use crate::models::reset_code::ResetCode;
use crate::reset::credentials::CredentialStore;
use crate::reset::delivery::{CodeDelivery, CodeEmail};
use crate::reset::error::ResetError;
use crate::reset::generator;
use crate::reset::store::ResetCodeStore;

/// Successful verification outcome: whose code it was and how much of the
/// attempt budget is left after this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeVerification {
    pub user_id: i32,
    pub attempts_remaining: i16,
}

/// Orchestrates issuance, verification and consumption of reset codes over
/// three injected capabilities: the record store, the credential store, and
/// the one-way code delivery queue.
pub struct ResetService<S, C, D> {
    store: S,
    credentials: C,
    delivery: D,
}

impl<S, C, D> ResetService<S, C, D>
where
    S: ResetCodeStore,
    C: CredentialStore,
    D: CodeDelivery,
{
    pub fn new(store: S, credentials: C, delivery: D) -> Self {
        Self {
            store,
            credentials,
            delivery,
        }
    }

    /// Issues a fresh code for the account behind `email`.
    ///
    /// Replaces any pending code (attempts back to 5, timestamps refreshed)
    /// and dispatches delivery without waiting on it. Succeeds whether or not
    /// a code was already pending.
    pub async fn issue_code(&self, email: &str) -> Result<(), ResetError> {
        let account = self
            .credentials
            .find_by_email(email)
            .await?
            .ok_or(ResetError::UserNotFound)?;

        let code = generator::generate();

        self.delivery.dispatch(CodeEmail {
            to: account.email.clone(),
            code: code.clone(),
        });

        self.store.upsert(account.id, &code).await?;
        Ok(())
    }

    /// Checks `submitted` against the pending code of the account behind
    /// `email`, spending one attempt in the process.
    pub async fn verify_code(
        &self,
        email: &str,
        submitted: &str,
    ) -> Result<CodeVerification, ResetError> {
        let account = self
            .credentials
            .find_by_email(email)
            .await?
            .ok_or(ResetError::UserNotFound)?;

        let record = self
            .store
            .get(account.id)
            .await?
            .ok_or(ResetError::NoResetInProgress)?;

        let updated = self.spend_attempt_and_check(&record, submitted).await?;

        Ok(CodeVerification {
            user_id: account.id,
            attempts_remaining: updated.attempts_remaining,
        })
    }

    /// Completes the reset: re-verifies the code (spending an attempt like
    /// every other call), deletes the record, rewrites the credential and
    /// revokes the account's recorded token.
    pub async fn consume_code(
        &self,
        user_id: i32,
        submitted: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError> {
        // Checked before anything touches the store: a mismatched
        // confirmation must not cost an attempt.
        if new_password != confirm_password {
            return Err(ResetError::PasswordMismatch);
        }

        let record = self
            .store
            .get(user_id)
            .await?
            .ok_or(ResetError::NoMatchingCode)?;

        self.spend_attempt_and_check(&record, submitted).await?;

        // Delete keyed on the exact (user, code) pair. A miss here means a
        // concurrent issue or consume got in between.
        if !self.store.delete_by_code(user_id, submitted).await? {
            return Err(ResetError::NoMatchingCode);
        }

        self.credentials.set_password(user_id, new_password).await?;
        // Tolerant of absence: the account may simply have no live session.
        self.credentials.revoke_token(user_id).await?;

        Ok(())
    }

    /// The shared attempt-decay step, in the authoritative order: exhaustion
    /// check (no mutation), unconditional decrement, code comparison, expiry
    /// check. The decrement lands even when the submitted code is correct or
    /// the record expired — every probe costs an attempt.
    async fn spend_attempt_and_check(
        &self,
        record: &ResetCode,
        submitted: &str,
    ) -> Result<ResetCode, ResetError> {
        if record.attempts_remaining == 0 {
            return Err(ResetError::AttemptsExhausted);
        }

        let updated = self
            .store
            .decrement_attempts(record.user_id)
            .await?
            // The guarded decrement found nothing to spend: a concurrent
            // call took the final attempt between our read and this write.
            .ok_or(ResetError::AttemptsExhausted)?;

        if updated.code != submitted {
            return Err(ResetError::WrongCode);
        }

        if updated.is_expired_at(Utc::now()) {
            return Err(ResetError::CodeExpired);
        }

        Ok(updated)
    }
}
