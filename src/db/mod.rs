use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::account::Account;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{InsertAccountError, PromoteOutcome};

/// Thin facade over the pooled connection and the per-table repositories.
/// Constructed once at startup and cloned into request handlers; no global
/// connection state.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn content_repo(&self) -> repositories::content::ContentRepository {
        repositories::content::ContentRepository::new(self.conn.clone())
    }

    pub async fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let Some(model) = self.user_repo().find_by_handle(handle).await? else {
            return Ok(None);
        };
        Ok(Some(Account::try_from(model)?))
    }

    pub async fn handle_exists(&self, handle: &str) -> Result<bool> {
        self.user_repo().exists(handle).await
    }

    pub async fn insert_unverified_account(
        &self,
        handle: &str,
        password_hash: &str,
        verification_code: &str,
        role: &str,
        now: &str,
    ) -> Result<i32, InsertAccountError> {
        self.user_repo()
            .insert_unverified(handle, password_hash, verification_code, role, now)
            .await
    }

    pub async fn promote_verified(&self, handle: &str, now: &str) -> Result<PromoteOutcome> {
        self.user_repo().promote_verified(handle, now).await
    }

    pub async fn find_verified_with_hash(&self, handle: &str) -> Result<Option<(Account, String)>> {
        self.user_repo().find_verified_with_hash(handle).await
    }

    pub async fn get_content(&self) -> Result<HashMap<String, String>> {
        self.content_repo().get_all().await
    }

    pub async fn update_content(&self, entries: &HashMap<String, String>, now: &str) -> Result<()> {
        self.content_repo().upsert_all(entries, now).await
    }
}
