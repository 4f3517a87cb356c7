use anyhow::{Context, Result};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use thiserror::Error;

use crate::entities::users;
use crate::models::account::Account;

/// Insert failure split out so the caller can map a unique-constraint hit to
/// its own "duplicate handle" error. The pre-insert existence check is
/// advisory only; this is the authoritative guard.
#[derive(Debug, Error)]
pub enum InsertAccountError {
    #[error("handle already registered")]
    DuplicateHandle,

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// Outcome of the verify-promotion transaction.
#[derive(Debug)]
pub enum PromoteOutcome {
    Promoted(users::Model),
    /// The conditional update matched no rows: a concurrent attempt (or an
    /// earlier one) already flipped the flag.
    AlreadyVerified,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_handle(&self, handle: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .one(&self.conn)
            .await
            .context("Failed to query account by handle")
    }

    pub async fn find_verified_by_handle(&self, handle: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .filter(users::Column::IsVerified.eq(true))
            .one(&self.conn)
            .await
            .context("Failed to query verified account by handle")
    }

    pub async fn exists(&self, handle: &str) -> Result<bool> {
        Ok(self.find_by_handle(handle).await?.is_some())
    }

    /// Inserts a fresh unverified account. Relies on the unique index on the
    /// handle column to close the check-then-insert race.
    pub async fn insert_unverified(
        &self,
        handle: &str,
        password_hash: &str,
        verification_code: &str,
        role: &str,
        now: &str,
    ) -> Result<i32, InsertAccountError> {
        let account = users::ActiveModel {
            handle: Set(handle.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            is_verified: Set(false),
            verification_code: Set(Some(verification_code.to_string())),
            created_at: Set(now.to_string()),
            verified_at: Set(None),
            ..Default::default()
        };

        let result = users::Entity::insert(account).exec(&self.conn).await;

        match result {
            Ok(inserted) => Ok(inserted.last_insert_id),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(InsertAccountError::DuplicateHandle)
                }
                _ => Err(InsertAccountError::Db(err)),
            },
        }
    }

    /// Promotes an account to verified inside a transaction. The update is
    /// conditional on `is_verified = false`, so of two concurrent attempts
    /// exactly one observes `Promoted`; the other gets `AlreadyVerified`.
    /// Any error path drops the transaction, which rolls it back.
    pub async fn promote_verified(&self, handle: &str, now: &str) -> Result<PromoteOutcome> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin verification transaction")?;

        let updated = users::Entity::update_many()
            .col_expr(users::Column::IsVerified, Expr::value(true))
            .col_expr(users::Column::VerifiedAt, Expr::value(Some(now)))
            .filter(users::Column::Handle.eq(handle))
            .filter(users::Column::IsVerified.eq(false))
            .exec(&txn)
            .await
            .context("Failed to update verification status")?;

        if updated.rows_affected == 0 {
            txn.rollback()
                .await
                .context("Failed to roll back verification transaction")?;
            return Ok(PromoteOutcome::AlreadyVerified);
        }

        let model = users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .one(&txn)
            .await
            .context("Failed to re-read account inside verification transaction")?
            .context("Account disappeared inside verification transaction")?;

        txn.commit()
            .await
            .context("Failed to commit verification transaction")?;

        Ok(PromoteOutcome::Promoted(model))
    }

    /// Loads the domain account plus its password hash for credential checks.
    pub async fn find_verified_with_hash(&self, handle: &str) -> Result<Option<(Account, String)>> {
        let Some(model) = self.find_verified_by_handle(handle).await? else {
            return Ok(None);
        };

        let hash = model.password_hash.clone();
        let account = Account::try_from(model)?;
        Ok(Some((account, hash)))
    }
}
