use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::LogError,
    log_event::record_event,
    state::AppState,
    validation::{validate_request, ValidatedRequest},
};

pub async fn handler(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    match try_log_event(&state, &method, &body).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn try_log_event(
    state: &AppState,
    method: &Method,
    body: &[u8],
) -> Result<Response, LogError> {
    let event = match validate_request(method, body)? {
        ValidatedRequest::Preflight => return Ok(StatusCode::OK.into_response()),
        ValidatedRequest::Write(event) => event,
    };

    let record = record_event(&state.pool, event).await?;

    Ok((StatusCode::CREATED, Json(record)).into_response())
}
