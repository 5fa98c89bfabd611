use std::{env, time::Duration};

const DEFAULT_COLLECTION_NAME: &str = "logs";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Mongo,
    Memory,
}

/// Process configuration, read once at cold start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    /// `None` when `MONGO_URI` is unset or empty; reported per request.
    pub mongo_uri: Option<String>,
    /// Falls back to the database named in the URI, then `test`.
    pub database_name: Option<String>,
    pub collection_name: String,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match non_empty("DATABASE_BACKEND").as_deref() {
            Some("memory") => Backend::Memory,
            _ => Backend::Mongo,
        };

        Self {
            backend,
            mongo_uri: non_empty("MONGO_URI"),
            database_name: non_empty("MONGO_DB_NAME"),
            collection_name: non_empty("LOG_COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
            connect_timeout: millis(
                "MONGO_CONNECT_TIMEOUT_MS",
                non_empty("MONGO_CONNECT_TIMEOUT_MS"),
                DEFAULT_CONNECT_TIMEOUT,
            ),
            write_timeout: millis(
                "MONGO_WRITE_TIMEOUT_MS",
                non_empty("MONGO_WRITE_TIMEOUT_MS"),
                DEFAULT_WRITE_TIMEOUT,
            ),
        }
    }
}

fn millis(key: &str, value: Option<String>, default: Duration) -> Duration {
    let Some(value) = value else {
        return default;
    };

    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            tracing::warn!("{key}={value} is not a positive integer, using {default:?}");
            default
        }
    }
}
