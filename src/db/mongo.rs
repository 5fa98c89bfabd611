use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    error::{Error as MongoError, ErrorKind},
    options::ClientOptions,
    Client, Collection, Database,
};
use tokio::time::timeout;

use crate::{
    config::Config,
    error::LogError,
    log_event::{LogEventRecord, NewLogEvent},
};

use super::{Connector, LogStore, StoreError};

const APP_NAME: &str = "e4ailog";
const FALLBACK_DATABASE_NAME: &str = "test";

/// Opens single-connection MongoDB clients.
pub struct MongoConnector {
    uri: Option<String>,
    database_name: Option<String>,
    collection_name: String,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl MongoConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            uri: config.mongo_uri.clone(),
            database_name: config.database_name.clone(),
            collection_name: config.collection_name.clone(),
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
        }
    }

    async fn open(&self, uri: &str) -> Result<Database, MongoError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_string());
        // Invocations within one context run one at a time.
        options.max_pool_size = Some(1);
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.connect_timeout);

        let client = Client::with_options(options)?;
        let database = match &self.database_name {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE_NAME)),
        };

        // The driver connects lazily; ping so failures surface here.
        database.run_command(doc! { "ping": 1 }).await?;
        Ok(database)
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self) -> Result<Arc<dyn LogStore>, LogError> {
        let Some(uri) = self.uri.as_deref() else {
            return Err(LogError::MissingConfiguration);
        };

        let database = timeout(self.connect_timeout, self.open(uri))
            .await
            .map_err(|_| {
                LogError::ConnectionFailed(format!(
                    "no response within {:?}",
                    self.connect_timeout
                ))
            })?
            .map_err(|e| LogError::ConnectionFailed(e.to_string()))?;

        tracing::info!(
            database = %database.name(),
            collection = %self.collection_name,
            "MongoDB connection established"
        );

        Ok(Arc::new(MongoStore {
            collection: database.collection::<Document>(&self.collection_name),
            write_timeout: self.write_timeout,
        }))
    }
}

/// The log collection on an established client.
pub struct MongoStore {
    collection: Collection<Document>,
    write_timeout: Duration,
}

#[async_trait]
impl LogStore for MongoStore {
    async fn insert_log_event(&self, event: NewLogEvent) -> Result<LogEventRecord, StoreError> {
        let id = ObjectId::new();
        let now = Utc::now();
        let written_at = bson::DateTime::from_millis(now.timestamp_millis());

        let document = doc! {
            "_id": id,
            "user": event.user.as_str(),
            "user_id": event.user_id.as_str(),
            "path": event.path.as_str(),
            "timestamp": event.timestamp.as_str(),
            "createdAt": written_at,
            "updatedAt": written_at,
        };

        bounded_write(self.write_timeout, self.collection.insert_one(document)).await?;

        Ok(LogEventRecord::new(id.to_hex(), event, now))
    }
}

/// Run a write under `limit`; a timeout counts as a lost connection.
async fn bounded_write<T>(
    limit: Duration,
    write: impl IntoFuture<Output = Result<T, MongoError>>,
) -> Result<T, StoreError> {
    timeout(limit, write)
        .await
        .map_err(|_| StoreError::Disconnected(format!("insert timed out after {limit:?}")))?
        .map_err(classify)
}

/// Split driver errors into "the server said no" and "the server is gone".
fn classify(error: MongoError) -> StoreError {
    let detail = error.to_string();
    match error.kind.as_ref() {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Disconnected(detail),
        _ => StoreError::Rejected(detail),
    }
}
