pub mod credentials;
pub mod delivery;
pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod store;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use credentials::{CredentialStore, PgCredentialStore};
pub use delivery::{spawn_delivery_worker, CodeDelivery, QueueDelivery};
pub use error::ResetError;
pub use lifecycle::{CodeVerification, ResetService};
pub use store::{PgResetCodeStore, ResetCodeStore};

/// The concrete service the application wires up: Postgres-backed stores and
/// the queue-backed delivery worker.
pub type AppResetService = ResetService<PgResetCodeStore, PgCredentialStore, QueueDelivery>;

lazy_static! {
    // A reset code is exactly five ASCII digits.
    static ref CODE_REGEX: regex::Regex = regex::Regex::new(r"^[0-9]{5}$").unwrap();
}

/// Payload for requesting a reset code email.
#[derive(Debug, Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(email)]
    pub email: String,
}

/// Payload for checking a received code without consuming it for a password
/// change yet.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckCodeRequest {
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = "CODE_REGEX", message = "Code must be exactly five digits"))]
    pub code: String,
}

/// Payload for completing the reset with a new password.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePasswordRequest {
    pub user_id: i32,
    #[validate(regex(path = "CODE_REGEX", message = "Code must be exactly five digits"))]
    pub code: String,
    /// Must be at least 6 characters long. Equality with `confirm_password`
    /// is enforced by the lifecycle, not here.
    #[validate(length(min = 6))]
    pub new_password: String,
    pub confirm_password: String,
}
