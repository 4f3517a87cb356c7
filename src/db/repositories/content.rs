use anyhow::{Context, Result};
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, EntityTrait, TransactionTrait, sea_query::OnConflict,
};
use std::collections::HashMap;

use crate::entities::site_content;

pub struct ContentRepository {
    conn: DatabaseConnection,
}

impl ContentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_all(&self) -> Result<HashMap<String, String>> {
        let rows = site_content::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to load site content")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.content_key, row.content_value))
            .collect())
    }

    /// Upserts every key in one transaction so a partial edit never lands.
    pub async fn upsert_all(&self, entries: &HashMap<String, String>, now: &str) -> Result<()> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to begin content transaction")?;

        for (key, value) in entries {
            let row = site_content::ActiveModel {
                content_key: Set(key.clone()),
                content_value: Set(value.clone()),
                updated_at: Set(now.to_string()),
                ..Default::default()
            };

            site_content::Entity::insert(row)
                .on_conflict(
                    OnConflict::column(site_content::Column::ContentKey)
                        .update_columns([
                            site_content::Column::ContentValue,
                            site_content::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .with_context(|| format!("Failed to upsert content key '{key}'"))?;
        }

        txn.commit()
            .await
            .context("Failed to commit content transaction")?;

        Ok(())
    }
}
