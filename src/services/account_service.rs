//! Domain service for the account lifecycle: register, verify, promote.

use serde::Serialize;
use thiserror::Error;

use crate::models::account::Role;

/// Error taxonomy for the account lifecycle. Everything except `Persistence`
/// is recoverable from the caller's perspective; `Persistence` is logged
/// server-side and surfaced as a generic failure.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("This handle is already registered")]
    DuplicateHandle,

    #[error("Account not found")]
    NotFound,

    #[error("This account is already verified")]
    AlreadyVerified,

    #[error("Could not reach the profile service. Try again later.")]
    VerificationServiceUnavailable,

    #[error("The verification code was not found in your motto. Make sure it contains: {expected}")]
    CodeNotFound { expected: String },

    #[error("Database error: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Result of a successful registration. The code is shown to the user so they
/// can place it in their profile motto.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub account_id: i32,
    pub handle: String,
    pub verification_code: String,
}

/// Result of a successful verification; feeds straight into auto-login.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedAccount {
    pub account_id: i32,
    pub handle: String,
    pub role: Role,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an unverified account and issues a verification code.
    ///
    /// # Errors
    ///
    /// [`AccountError::Validation`] for a bad handle or weak password,
    /// [`AccountError::DuplicateHandle`] if the handle is taken.
    async fn register(&self, handle: &str, password: &str) -> Result<Registration, AccountError>;

    /// Checks the profile motto for the stored code and, on match, promotes
    /// the account to verified in one atomic step.
    ///
    /// # Errors
    ///
    /// [`AccountError::VerificationServiceUnavailable`] leaves state untouched
    /// and is safe to retry; [`AccountError::AlreadyVerified`] signals the
    /// idempotence guard, including the concurrent double-verify case.
    async fn verify_account(&self, handle: &str) -> Result<VerifiedAccount, AccountError>;
}
