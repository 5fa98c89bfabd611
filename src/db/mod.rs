pub mod memory;
pub mod mongo;
pub mod pool;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::Config,
    error::LogError,
    log_event::{LogEventRecord, NewLogEvent},
};

/// Why a store refused or failed an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store answered and rejected the write.
    Rejected(String),
    /// The connection is gone or stopped answering; reconnect before retrying.
    Disconnected(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Rejected(detail) => write!(f, "write rejected: {detail}"),
            StoreError::Disconnected(detail) => write!(f, "connection lost: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// An established connection to the document store.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one event as a new entity and return it as stored.
    async fn insert_log_event(&self, event: NewLogEvent) -> Result<LogEventRecord, StoreError>;
}

/// Opens connections to the document store.
///
/// Each call to [`Connector::connect`] establishes a fresh connection;
/// reuse is the job of [`pool::ConnectionPool`].
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn LogStore>, LogError>;
}

/// Create a MongoDB connector from the loaded configuration.
pub fn mongo(config: &Config) -> Arc<dyn Connector> {
    Arc::new(mongo::MongoConnector::new(config))
}

/// Create an in-memory connector for local development and testing.
pub fn memory() -> Arc<dyn Connector> {
    Arc::new(memory::MemoryConnector::new())
}
