//! Durable key-value store
//!
//! String-valued key-value interface used to persist selections. Callers own the
//! encoding (JSON); the store only moves strings.
//!
//! Two implementations:
//! - [`SqliteKvStore`] - `kv_store` table in the application database
//! - [`MemoryKvStore`] - process-local map for tests and throwaway sessions

use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Asynchronous string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Key-value store backed by the SQLite `kv_store` table
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Wrap a pool whose schema has been migrated
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}

/// In-memory key-value store
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store, e.g. with a legacy storage layout
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
