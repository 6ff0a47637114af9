//! SQLite record store implementation

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use taxonomy_kit_domain::{
    RecordStore, RecordWriter, StoreEntry, StoreError, StoreSession, record_key,
};

/// SQLite-backed record store: one `records` table of JSON bodies keyed by `id`
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a new SQLite record store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Connection(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        tracing::debug!(path = %db_path.display(), "Record store ready");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        // A single connection that never expires; the database lives and dies with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn open(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Box::new(SqliteSession { conn }))
    }
}

#[async_trait]
impl RecordWriter for SqliteRecordStore {
    async fn put(&self, record: Value) -> Result<(), StoreError> {
        let key = record_key(&record)?;
        let body =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO records (id, body)
            VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET body = excluded.body
            "#,
        )
        .bind(key)
        .bind(&body)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }
}

/// A pooled connection held for the duration of one resolver call
struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

#[async_trait]
impl StoreSession for SqliteSession {
    async fn get(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM records WHERE id = ?")
            .bind(key)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        row.map(|(body,)| parse_body(&body)).transpose()
    }

    fn cursor(&mut self) -> BoxStream<'_, Result<StoreEntry, StoreError>> {
        sqlx::query_as::<_, (String, String)>("SELECT id, body FROM records")
            .fetch(&mut *self.conn)
            .map(|row| {
                let (id, body) = row.map_err(|e| StoreError::Read(e.to_string()))?;
                // A corrupt body must not end a key scan
                let value = parse_body(&body).unwrap_or_else(|e| {
                    tracing::warn!(key = %id, error = %e, "Skipping unreadable record body");
                    Value::Null
                });
                Ok((id, value))
            })
            .boxed()
    }
}

fn parse_body(body: &str) -> Result<Value, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Serialization(e.to_string()))
}
