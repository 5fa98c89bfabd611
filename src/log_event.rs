use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::{pool::ConnectionPool, StoreError},
    error::LogError,
};

/// A validated usage event, ready to be written.
///
/// All four fields are caller-supplied text and are stored verbatim;
/// `timestamp` in particular is never parsed or normalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEvent {
    pub user: String,
    pub user_id: String,
    pub path: String,
    pub timestamp: String,
}

/// A stored usage event as reported back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEventRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub user_id: String,
    pub path: String,
    pub timestamp: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl LogEventRecord {
    pub fn new(id: String, event: NewLogEvent, written_at: DateTime<Utc>) -> Self {
        let written_at = written_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id,
            user: event.user,
            user_id: event.user_id,
            path: event.path,
            timestamp: event.timestamp,
            created_at: written_at.clone(),
            updated_at: written_at,
        }
    }
}

/// Write one event through the cached connection.
///
/// A connection-level write failure drops the cached connection so the next
/// invocation reconnects; a rejected write leaves it in place.
pub async fn record_event(
    pool: &ConnectionPool,
    event: NewLogEvent,
) -> Result<LogEventRecord, LogError> {
    let store = pool.acquire().await?;

    match store.insert_log_event(event).await {
        Ok(record) => {
            tracing::debug!(id = %record.id, path = %record.path, "Log entry written");
            Ok(record)
        }
        Err(StoreError::Rejected(detail)) => {
            tracing::error!(error = %detail, "Error saving log entry");
            Err(LogError::WriteFailed(detail))
        }
        Err(StoreError::Disconnected(detail)) => {
            tracing::error!(error = %detail, "Error saving log entry, resetting connection");
            pool.invalidate().await;
            Err(LogError::WriteFailed(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::db::{memory::MemoryConnector, Connector, LogStore};

    fn sample_event() -> NewLogEvent {
        NewLogEvent {
            user: "alice".to_string(),
            user_id: "u1".to_string(),
            path: "/home".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    struct FailingStore(fn(String) -> StoreError);

    #[async_trait]
    impl LogStore for FailingStore {
        async fn insert_log_event(
            &self,
            _event: NewLogEvent,
        ) -> Result<LogEventRecord, StoreError> {
            Err((self.0)("boom".to_string()))
        }
    }

    struct FailingConnector {
        error: fn(String) -> StoreError,
        connects: AtomicUsize,
    }

    #[async_trait]
    impl Connector for FailingConnector {
        async fn connect(&self) -> Result<Arc<dyn LogStore>, LogError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FailingStore(self.error)))
        }
    }

    #[test]
    fn test_record_copies_fields_and_write_instant() {
        let written_at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let record = LogEventRecord::new("abc".to_string(), sample_event(), written_at);

        assert_eq!(record.id, "abc");
        assert_eq!(record.user, "alice");
        assert_eq!(record.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(record.created_at, "2024-05-06T07:08:09.000Z");
        assert_eq!(record.updated_at, record.created_at);
    }

    #[test]
    fn test_record_serializes_with_store_field_names() {
        let written_at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let record = LogEventRecord::new("abc".to_string(), sample_event(), written_at);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["_id"], "abc");
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["createdAt"], "2024-05-06T07:08:09.000Z");
        assert!(json.get("id").is_none());
    }

    #[tokio::test]
    async fn test_record_event_writes_one_entity() {
        let connector = Arc::new(MemoryConnector::new());
        let pool = ConnectionPool::new(connector.clone());

        let record = record_event(&pool, sample_event()).await.unwrap();

        assert_eq!(record.user, "alice");
        assert_eq!(record.path, "/home");
        assert_eq!(connector.store().events(), vec![record]);
    }

    #[tokio::test]
    async fn test_identical_events_are_stored_separately() {
        let connector = Arc::new(MemoryConnector::new());
        let pool = ConnectionPool::new(connector.clone());

        let first = record_event(&pool, sample_event()).await.unwrap();
        let second = record_event(&pool, sample_event()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(connector.store().events().len(), 2);
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_write_keeps_connection() {
        let connector = Arc::new(FailingConnector {
            error: StoreError::Rejected,
            connects: AtomicUsize::new(0),
        });
        let pool = ConnectionPool::new(connector.clone());

        let err = record_event(&pool, sample_event()).await.unwrap_err();
        assert_eq!(err, LogError::WriteFailed("boom".to_string()));
        assert!(pool.is_established().await);

        record_event(&pool, sample_event()).await.unwrap_err();
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnected_write_resets_connection() {
        let connector = Arc::new(FailingConnector {
            error: StoreError::Disconnected,
            connects: AtomicUsize::new(0),
        });
        let pool = ConnectionPool::new(connector.clone());

        let err = record_event(&pool, sample_event()).await.unwrap_err();
        assert_eq!(err, LogError::WriteFailed("boom".to_string()));
        assert!(!pool.is_established().await);

        record_event(&pool, sample_event()).await.unwrap_err();
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }
}
