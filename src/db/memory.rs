use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::LogError,
    log_event::{LogEventRecord, NewLogEvent},
};

use super::{Connector, LogStore, StoreError};

/// In-memory log collection for local development and testing.
/// Append-only; entities are never updated or removed.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<Vec<LogEventRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored entity in insertion order.
    pub fn events(&self) -> Vec<LogEventRecord> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn insert_log_event(&self, event: NewLogEvent) -> Result<LogEventRecord, StoreError> {
        let record = LogEventRecord::new(Uuid::new_v4().simple().to_string(), event, Utc::now());

        // A push can't leave the vector half-written, so a poisoned lock is safe to reuse.
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        Ok(record)
    }
}

/// Hands out the same [`MemoryStore`] on every connect and counts the calls.
#[derive(Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Number of times a connection has been established.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn LogStore>, LogError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let store: Arc<dyn LogStore> = self.store.clone();
        Ok(store)
    }
}
