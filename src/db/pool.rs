use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::LogError;

use super::{Connector, LogStore};

/// Caches the single outbound store connection for this execution context.
///
/// The slot is empty until a connect succeeds and stays filled until
/// [`ConnectionPool::invalidate`] is called. A failed connect leaves it empty,
/// so the next invocation starts over.
pub struct ConnectionPool {
    connector: Arc<dyn Connector>,
    established: Mutex<Option<Arc<dyn LogStore>>>,
}

impl ConnectionPool {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            established: Mutex::new(None),
        }
    }

    /// Return the cached connection, connecting first if there is none.
    pub async fn acquire(&self) -> Result<Arc<dyn LogStore>, LogError> {
        // Held across connect so two callers never both open a connection.
        let mut slot = self.established.lock().await;

        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = self.connector.connect().await.inspect_err(|e| match e {
            LogError::MissingConfiguration => tracing::error!("MONGO_URI is not defined"),
            other => tracing::error!(error = %other, "MongoDB connection error"),
        })?;

        tracing::info!("Connected to document store");
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Drop the cached connection so the next [`acquire`](Self::acquire) reconnects.
    pub async fn invalidate(&self) {
        if self.established.lock().await.take().is_some() {
            tracing::warn!("Discarded cached document store connection");
        }
    }

    pub async fn is_established(&self) -> bool {
        self.established.lock().await.is_some()
    }
}
