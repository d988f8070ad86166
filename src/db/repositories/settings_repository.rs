use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::Setting;
use crate::db::DatabaseError;

use super::SettingsStore;

pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Setting>, DatabaseError> {
        let row = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
        description: Option<&str>,
    ) -> Result<Setting, DatabaseError> {
        // Single-statement upsert: readers see either the old or the new
        // value, never a partial one.
        let row = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                description = EXCLUDED.description,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn all(&self) -> Result<Vec<Setting>, DatabaseError> {
        let rows = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
