mod log_event;

use axum::{extract::DefaultBodyLimit, middleware, Router};

use crate::{middleware::cors::cors_headers_middleware, state::AppState};

/// The function is mounted at a single URL, so every path and method lands
/// on the log handler, which does its own method check. Event fields have
/// no length bound; the Lambda payload cap is the only limit.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(log_event::handler)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(cors_headers_middleware))
        .with_state(state)
}
