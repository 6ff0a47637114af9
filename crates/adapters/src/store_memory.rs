//! In-memory record store for testing and offline mode

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use taxonomy_kit_domain::{
    RecordStore, RecordWriter, StoreEntry, StoreError, StoreSession, record_key,
};

/// In-memory record store implementation. Scan order is unspecified.
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Value>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Build a store pre-populated with `records`, each keyed by its `id`
    pub fn with_records(records: impl IntoIterator<Item = Value>) -> Result<Self, StoreError> {
        let mut map = HashMap::new();
        for record in records {
            map.insert(record_key(&record)?.to_string(), record);
        }
        Ok(Self {
            records: RwLock::new(map),
        })
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn open(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        Ok(Box::new(InMemorySession { store: self }))
    }
}

#[async_trait]
impl RecordWriter for InMemoryRecordStore {
    async fn put(&self, record: Value) -> Result<(), StoreError> {
        let key = record_key(&record)?.to_string();
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        records.insert(key, record);
        Ok(())
    }
}

struct InMemorySession<'a> {
    store: &'a InMemoryRecordStore,
}

#[async_trait]
impl<'a> StoreSession for InMemorySession<'a> {
    async fn get(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        let records = self
            .store
            .records
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(records.get(key).cloned())
    }

    fn cursor(&mut self) -> BoxStream<'_, Result<StoreEntry, StoreError>> {
        // Snapshot so the lock is not held while the caller iterates
        let snapshot = match self.store.records.read() {
            Ok(records) => records
                .iter()
                .map(|(k, v)| Ok((k.clone(), v.clone())))
                .collect::<Vec<_>>(),
            Err(e) => vec![Err(StoreError::Read(e.to_string()))],
        };
        stream::iter(snapshot).boxed()
    }
}
