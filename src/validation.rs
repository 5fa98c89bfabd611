use axum::http::Method;
use serde_json::Value;

use crate::{error::LogError, log_event::NewLogEvent};

/// Outcome of a request that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidatedRequest {
    /// CORS preflight probe; answered without reading the body.
    Preflight,
    Write(NewLogEvent),
}

/// Check method, then JSON syntax, then record shape.
///
/// Each step short-circuits, so an invalid request never reaches the store.
/// Unknown fields in the body are ignored.
pub fn validate_request(method: &Method, body: &[u8]) -> Result<ValidatedRequest, LogError> {
    if *method == Method::OPTIONS {
        return Ok(ValidatedRequest::Preflight);
    }

    if *method != Method::POST {
        return Err(LogError::MethodNotAllowed);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| LogError::InvalidPayload(e.to_string()))?;

    // serde would also accept a positional array for a struct
    if !value.is_object() {
        return Err(LogError::InvalidFields("expected a JSON object".to_string()));
    }

    let event = serde_json::from_value::<NewLogEvent>(value)
        .map_err(|e| LogError::InvalidFields(e.to_string()))?;

    Ok(ValidatedRequest::Write(event))
}
