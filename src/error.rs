use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Unified error type for the log endpoint.
///
/// Each variant maps to an HTTP status code and produces a JSON response
/// body of the form `{"error": "<message>"}`. The `String` payloads carry
/// diagnostic detail for the logs only; callers always see the fixed
/// message returned by [`LogError::message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    MethodNotAllowed,
    InvalidPayload(String),
    InvalidFields(String),
    MissingConfiguration,
    ConnectionFailed(String),
    WriteFailed(String),
}

impl LogError {
    pub fn status(&self) -> StatusCode {
        match self {
            LogError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            LogError::InvalidPayload(_) | LogError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            LogError::MissingConfiguration
            | LogError::ConnectionFailed(_)
            | LogError::WriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LogError::MethodNotAllowed => "Method Not Allowed",
            LogError::InvalidPayload(_) => "Invalid JSON payload",
            LogError::InvalidFields(_) => {
                r#"Fields "user", "user_id", "path", and "timestamp" must be strings."#
            }
            LogError::MissingConfiguration => "MONGO_URI is not defined.",
            LogError::ConnectionFailed(_) => "Database connection failed.",
            LogError::WriteFailed(_) => "Failed to write log entry.",
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            LogError::InvalidPayload(detail) => write!(f, "Invalid JSON payload: {detail}"),
            LogError::InvalidFields(detail) => write!(f, "Invalid fields: {detail}"),
            LogError::MissingConfiguration => write!(f, "MONGO_URI is not defined"),
            LogError::ConnectionFailed(detail) => write!(f, "Database connection failed: {detail}"),
            LogError::WriteFailed(detail) => write!(f, "Failed to write log entry: {detail}"),
        }
    }
}

impl std::error::Error for LogError {}

impl IntoResponse for LogError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}
