use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Same as axum's default body limit.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Logs method, path and body of every request. The body is buffered and
/// handed on unchanged.
pub async fn log_request(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read body of {} {}: {}", parts.method, parts.uri.path(), e);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    tracing::info!(
        method = %parts.method,
        path = parts.uri.path(),
        body = %String::from_utf8_lossy(&bytes),
        "incoming request"
    );

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
