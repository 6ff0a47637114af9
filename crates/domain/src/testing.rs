//! Test doubles shared by the use case tests

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde_json::Value;
use std::sync::Mutex;

use crate::ports::{RecordStore, RecordWriter, StoreEntry, StoreError, StoreSession, record_key};

/// Where a `MapStore` should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Open,
    Get,
    /// Yield the first record, then fail
    Cursor,
}

/// Insertion-ordered record store so tests control the physical scan order
#[derive(Default)]
pub struct MapStore {
    records: Mutex<Vec<StoreEntry>>,
    failure: Option<Failure>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub fn with(self, record: Value) -> Self {
        let key = record_key(&record).unwrap().to_string();
        self.insert(key, record);
        self
    }

    fn insert(&self, key: String, record: Value) {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = record,
            None => records.push((key, record)),
        }
    }
}

#[async_trait]
impl RecordStore for MapStore {
    async fn open(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        if self.failure == Some(Failure::Open) {
            return Err(StoreError::Connection("store unavailable".to_string()));
        }
        Ok(Box::new(MapSession { store: self }))
    }
}

#[async_trait]
impl RecordWriter for MapStore {
    async fn put(&self, record: Value) -> Result<(), StoreError> {
        let key = record_key(&record)?.to_string();
        self.insert(key, record);
        Ok(())
    }
}

struct MapSession<'a> {
    store: &'a MapStore,
}

#[async_trait]
impl<'a> StoreSession for MapSession<'a> {
    async fn get(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.store.failure == Some(Failure::Get) {
            return Err(StoreError::Read("disk on fire".to_string()));
        }
        let records = self.store.records.lock().unwrap();
        Ok(records.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    }

    fn cursor(&mut self) -> BoxStream<'_, Result<StoreEntry, StoreError>> {
        let records = self.store.records.lock().unwrap().clone();
        if self.store.failure == Some(Failure::Cursor) {
            let first = records.into_iter().take(1).map(Ok);
            let failure = Err(StoreError::Read("cursor aborted".to_string()));
            return stream::iter(first.chain(std::iter::once(failure))).boxed();
        }
        stream::iter(records.into_iter().map(Ok)).boxed()
    }
}
