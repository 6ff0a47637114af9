//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;

/// Error type for record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Read error: {0}")]
    Read(String),
    #[error("Write error: {0}")]
    Write(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// A `(key, record)` pair yielded by a cursor
pub type StoreEntry = (String, Value);

/// Port for a flat key-value table of JSON records keyed by their `id` field.
///
/// Every caller gets its own session from `open`; the session is released
/// when it is dropped.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Acquire a read-only session
    async fn open(&self) -> Result<Box<dyn StoreSession + '_>, StoreError>;
}

/// A read-only view over the record table
#[async_trait]
pub trait StoreSession: Send {
    /// Point lookup by key
    async fn get(&mut self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Lazily enumerate every record. Order is unspecified.
    fn cursor(&mut self) -> BoxStream<'_, Result<StoreEntry, StoreError>>;
}

/// Port for writing records (ingestion side only)
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Insert or replace a record under the key held in its `id` field
    async fn put(&self, record: Value) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn open(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        (**self).open().await
    }
}

#[async_trait]
impl<T: RecordWriter + ?Sized> RecordWriter for Arc<T> {
    async fn put(&self, record: Value) -> Result<(), StoreError> {
        (**self).put(record).await
    }
}

/// Extract the key of a record, mirroring a key path of `id`
pub fn record_key(record: &Value) -> Result<&str, StoreError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::InvalidRecord("record has no string `id` field".to_string()))
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
