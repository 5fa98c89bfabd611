use std::sync::Arc;

use crate::{
    config::{Backend, Config},
    db::{self, pool::ConnectionPool, Connector},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ConnectionPool>,
}

impl AppState {
    /// Build the state once per execution context; the pool it holds is
    /// shared by every invocation that context serves.
    pub fn new(config: &Config) -> Self {
        let connector = match config.backend {
            Backend::Memory => {
                tracing::info!("Using in-memory database backend");
                db::memory()
            }
            Backend::Mongo => {
                tracing::info!(
                    collection = %config.collection_name,
                    "Using MongoDB database backend"
                );
                if config.mongo_uri.is_none() {
                    tracing::warn!("MONGO_URI not set, log writes will fail");
                }
                db::mongo(config)
            }
        };

        Self::with_connector(connector)
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new(connector)),
        }
    }
}
