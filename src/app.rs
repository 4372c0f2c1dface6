//! Route table and the fixed middleware pipeline.

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{Config, ConfigError},
    error::unknown_endpoint,
    handlers::{self, rest},
    middleware::{
        logger::log_request,
        request_id::{self, propagate_request_id_layer, set_request_id_layer},
    },
    state::AppState,
    telemetry::track_requests,
};

/// Requests pass, outermost first: request id, trace span, request id
/// propagation, CORS, request logger, telemetry, then the routes. Unmatched
/// requests and forwarded failures are answered by the error pipeline inside
/// that stack.
///
/// `Cors` needs a `Default` response body, so it has to sit inside `TraceLayer`.
pub fn build_router(state: AppState, config: &Config) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&config.cors_allowed_origins)?;

    let pipeline = ServiceBuilder::new()
        .layer(set_request_id_layer())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request_id::request_id(request),
                )
            }),
        )
        .layer(propagate_request_id_layer())
        .layer(cors)
        .layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn_with_state(
            state.telemetry().clone(),
            track_requests,
        ));

    let router = Router::new()
        .route("/", get(handlers::root))
        .route(
            "/api/notes",
            get(rest::get_all_notes).post(rest::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(rest::get_one_note)
                .put(rest::update_note)
                .delete(rest::delete_note),
        )
        .nest_service("/images", ServeDir::new(&config.images_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .fallback(unknown_endpoint)
        .method_not_allowed_fallback(unknown_endpoint)
        .with_state(state)
        .layer(pipeline);

    Ok(router)
}

/// `*` allows any origin, anything else is a comma-separated origin list.
pub fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.trim() == "*" {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "cors_allowed_origins".to_string(),
                    reason: format!("'{origin}': {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors.allow_origin(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_origin_list() {
        assert!(build_cors_layer("*").is_ok());
        assert!(build_cors_layer("http://localhost:5173, https://notes.example").is_ok());
    }

    #[test]
    fn cors_rejects_invalid_origin() {
        let err = build_cors_layer("http://ok.example,bad\norigin").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
