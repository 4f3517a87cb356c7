//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::account::SessionAccount;
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::credentials;

/// Well-formed Argon2id PHC string that matches no password. Unknown handles
/// run a verification against it so that path costs the same as a wrong
/// password on an existing account.
const UNKNOWN_HANDLE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, handle: &str, password: &str) -> Result<SessionAccount, AuthError> {
        let handle = handle.trim();

        match self.store.find_verified_with_hash(handle).await? {
            Some((account, stored_hash)) => {
                if credentials::verify_password(password, &stored_hash).await? {
                    Ok(SessionAccount {
                        account_id: account.id,
                        handle: account.handle,
                        role: account.role,
                    })
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => {
                let _ = credentials::verify_password(password, UNKNOWN_HANDLE_HASH).await;
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
