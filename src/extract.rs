//! Optional JSON request bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Like `Json`, but a missing body gives `None` instead of a rejection.
///
/// A body counts as missing when it is empty, a literal `null`, or not sent
/// with a JSON content type. Invalid JSON is forwarded to the error pipeline.
pub struct JsonBody<T>(pub Option<T>);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self(None));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        serde_json::from_slice::<Option<T>>(&bytes)
            .map(Self)
            .map_err(|e| ApiError::MalformedBody(e).into_response())
    }
}

/// `application/json` or any `+json` suffix, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::UpdateNoteRequest;
    use axum::{body::Body, http::StatusCode};

    async fn extract_as(
        content_type: Option<&'static str>,
        body: &'static str,
    ) -> Result<JsonBody<UpdateNoteRequest>, Response> {
        let mut request = Request::builder().method("PUT").uri("/");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body)).unwrap();
        JsonBody::<UpdateNoteRequest>::from_request(request, &()).await
    }

    async fn extract(body: &'static str) -> Result<JsonBody<UpdateNoteRequest>, Response> {
        extract_as(Some("application/json"), body).await
    }

    #[tokio::test]
    async fn empty_and_null_bodies_are_none() {
        assert!(extract("").await.unwrap().0.is_none());
        assert!(extract("  \n").await.unwrap().0.is_none());
        assert!(extract("null").await.unwrap().0.is_none());
    }

    #[tokio::test]
    async fn object_body_is_parsed() {
        let JsonBody(body) = extract(r#"{"content":"a","id":"ignored"}"#).await.unwrap();
        assert_eq!(body.unwrap().content.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let Err(response) = extract("{oops").await else {
            panic!("expected rejection");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_json_content_type_is_none() {
        let JsonBody(body) = extract_as(Some("text/plain"), "hello").await.unwrap();
        assert!(body.is_none());

        let JsonBody(body) = extract_as(None, r#"{"content":"a"}"#).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn json_content_type_variants_are_parsed() {
        for content_type in [
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/merge-patch+json",
        ] {
            let JsonBody(body) = extract_as(Some(content_type), r#"{"important":true}"#)
                .await
                .unwrap();
            assert_eq!(body.unwrap().important, Some(true), "{content_type}");
        }
    }
}
