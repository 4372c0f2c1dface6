//! The error pipeline: every failure a handler forwards ends up here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{dto::ErrorResponse, repository::StoreError};

/// Failure forwarded by a handler with `?`.
///
/// The client only gets a generic message. The full error is logged and
/// attached to the response as a [`FailureReport`] for the telemetry layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::MalformedId(_)) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Store(StoreError::MalformedId(_)) => "malformatted id",
            Self::MalformedBody(_) => "malformed request body",
            Self::Store(_) => "internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }

        let mut response = (status, Json(ErrorResponse::new(self.public_message()))).into_response();
        response
            .extensions_mut()
            .insert(FailureReport(self.to_string()));
        response
    }
}

/// Full text of a forwarded failure, never sent to the client.
#[derive(Debug, Clone)]
pub struct FailureReport(String);

impl FailureReport {
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Fallback for requests no route matched.
pub async fn unknown_endpoint() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("unknown endpoint")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Store(StoreError::MalformedId("x".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MalformedBody(body_error()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_hides_details_but_reports_them() {
        let response = ApiError::Store(StoreError::MalformedId("secret-id".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let report = response.extensions().get::<FailureReport>().unwrap();
        assert!(report.message().contains("secret-id"));
    }

    #[tokio::test]
    async fn unknown_endpoint_is_404_with_body() {
        let response = unknown_endpoint().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<FailureReport>().is_none());
    }
}
