use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use serde_json::Value;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{CreateNoteRequest, ErrorResponse, NoteResponse, UpdateNoteRequest},
    error::ApiError,
    extract::JsonBody,
    service::NoteService,
};

pub const CONTENT_MISSING: &str = "note.content is missing";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_note,
        update_note,
        delete_note,
        get_one_note,
        get_all_notes
    ),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        ErrorResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Content missing or body malformed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Response, ApiError> {
    let payload = payload.unwrap_or_default();

    if !CreateNoteRequest::has_content(&payload) {
        return Ok(content_missing());
    }

    let CreateNoteRequest { content, important } = serde_json::from_value(payload)?;
    let Some(content) = content else {
        return Ok(content_missing());
    };

    let note = service
        .create_note(content, important.unwrap_or(false))
        .await?;

    Ok((StatusCode::CREATED, Json(note)).into_response())
}

fn content_missing() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(CONTENT_MISSING))).into_response()
}

/// An unknown id answers `200 null`, not 404.
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated note, or null if no note has this id", body = NoteResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateNoteRequest>,
) -> Result<Json<Option<NoteResponse>>, ApiError> {
    let note = service
        .update_note(&id, payload.unwrap_or_default())
        .await?;

    Ok(Json(note))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted, or there was none"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !service.delete_note(&id).await? {
        tracing::debug!("delete of unknown note {}", id);
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found, empty body"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(match service.get_one_note(&id).await? {
        Some(note) => (StatusCode::OK, Json(note)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

#[utoipa::path(
    get,
    path = "/api/notes",
    responses(
        (status = 200, description = "List of all notes", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(
    State(service): State<Arc<NoteService>>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    Ok(Json(service.get_all_notes().await?))
}
