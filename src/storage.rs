use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, PoisonError, RwLock},
};

use anyhow::Context as _;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::error::Result;

/// durable key/value snapshots, kept in the `kv_store` table.
#[derive(Clone, Debug)]
pub struct Storage {
    db: Pool<Sqlite>,
}

impl Storage {
    pub async fn open(db_url: &str) -> anyhow::Result<Self> {
        tracing::info!("initializing database connection...");
        let opts = SqliteConnectOptions::from_str(db_url)
            .with_context(|| format!("invalid DATABASE_URL {db_url}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        Self::migrate(db).await
    }

    /// a private database that lives as long as the pool's single connection.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        Self::migrate(db).await.unwrap()
    }

    async fn migrate(db: Pool<Sqlite>) -> anyhow::Result<Self> {
        tracing::info!("running migrations...");
        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("finished running migrations!");

        Ok(Storage { db })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
                SELECT value
                FROM kv_store
                WHERE key = $1;
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, key = %key, "an error occurred when reading from db"))?;

        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
                INSERT INTO
                    kv_store (key, value)
                VALUES
                    ($1, $2)
                ON CONFLICT (key)
                DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now');
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, key = %key, "an error occurred when writing to db"))?;

        Ok(())
    }
}

/// state that only lives as long as the running process.
#[derive(Clone, Debug, Default)]
pub struct SessionStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: String) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw);

        Ok(())
    }
}
