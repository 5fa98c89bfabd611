use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Middleware that adds CORS headers to every response, errors included.
pub async fn cors_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(ALLOW_HEADERS),
    );

    response
}
