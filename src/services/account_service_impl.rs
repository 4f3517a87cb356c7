//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::clients::habbo::HabboClient;
use crate::config::SecurityConfig;
use crate::db::{InsertAccountError, PromoteOutcome, Store};
use crate::models::account::{Account, AccountStatus, Role};
use crate::services::account_service::{
    AccountError, AccountService, Registration, VerifiedAccount,
};
use crate::services::credentials;
use std::sync::Arc;

pub struct SeaOrmAccountService {
    store: Store,
    habbo: Arc<HabboClient>,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, habbo: Arc<HabboClient>, security: SecurityConfig) -> Self {
        Self {
            store,
            habbo,
            security,
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, handle: &str, password: &str) -> Result<Registration, AccountError> {
        let handle = handle.trim();

        if !credentials::handle_length_ok(handle) {
            return Err(AccountError::Validation(format!(
                "The handle must be between {} and {} characters",
                credentials::HANDLE_MIN_LEN,
                credentials::HANDLE_MAX_LEN
            )));
        }

        if !credentials::handle_charset_ok(handle) {
            return Err(AccountError::Validation(
                "The handle may only contain letters, numbers, dots, hyphens and underscores"
                    .to_string(),
            ));
        }

        if !credentials::is_password_strong(password) {
            return Err(AccountError::Validation(
                "The password must be at least 8 characters and include uppercase, lowercase, \
                 a digit and a special character"
                    .to_string(),
            ));
        }

        // Advisory pre-check; the unique index on the handle column is the
        // authoritative guard below.
        if self.store.handle_exists(handle).await? {
            return Err(AccountError::DuplicateHandle);
        }

        let password_hash = credentials::hash_password(password, &self.security).await?;
        let verification_code = credentials::generate_verification_code();
        let now = chrono::Utc::now().to_rfc3339();

        let account_id = self
            .store
            .insert_unverified_account(
                handle,
                &password_hash,
                &verification_code,
                Role::Member.as_str(),
                &now,
            )
            .await
            .map_err(|e| match e {
                InsertAccountError::DuplicateHandle => AccountError::DuplicateHandle,
                InsertAccountError::Db(err) => AccountError::Persistence(err.to_string()),
            })?;

        info!("Registered account {account_id} for handle '{handle}'");

        Ok(Registration {
            account_id,
            handle: handle.to_string(),
            verification_code,
        })
    }

    async fn verify_account(&self, handle: &str) -> Result<VerifiedAccount, AccountError> {
        let handle = handle.trim();

        let account = self
            .store
            .get_account_by_handle(handle)
            .await?
            .ok_or(AccountError::NotFound)?;

        let code = match account.status {
            AccountStatus::Verified { .. } => return Err(AccountError::AlreadyVerified),
            AccountStatus::Unverified { code } => code,
        };

        // Any lookup failure leaves local state untouched; the user can retry.
        let motto = self
            .habbo
            .lookup_motto(&account.handle)
            .await
            .map_err(|e| {
                warn!("Profile lookup for '{}' failed: {e}", account.handle);
                AccountError::VerificationServiceUnavailable
            })?;

        if !motto.contains(&code) {
            return Err(AccountError::CodeNotFound { expected: code });
        }

        let now = chrono::Utc::now().to_rfc3339();

        match self.store.promote_verified(&account.handle, &now).await? {
            PromoteOutcome::AlreadyVerified => Err(AccountError::AlreadyVerified),
            PromoteOutcome::Promoted(model) => {
                let account = Account::try_from(model)?;
                info!("Account {} ('{}') verified", account.id, account.handle);

                Ok(VerifiedAccount {
                    account_id: account.id,
                    handle: account.handle,
                    role: account.role,
                })
            }
        }
    }
}
