//! Domain service for session authentication.

use thiserror::Error;

use crate::models::account::SessionAccount;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately covers both "no such handle" and "wrong password" so the
    /// login boundary cannot be used to enumerate handles.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Checks credentials against verified accounts only.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for any credential failure.
    async fn login(&self, handle: &str, password: &str) -> Result<SessionAccount, AuthError>;
}
