use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Note;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: Uuid,
    /// Note content
    pub content: String,
    /// Whether the note is flagged as important
    pub important: bool,
    /// Creation time
    pub date: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            important: note.important,
            date: note.date,
        }
    }
}

/// Unknown fields such as `id` or `date` are accepted and dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note content, must not be empty
    pub content: Option<String>,
    /// Defaults to false
    pub important: Option<bool>,
}

impl CreateNoteRequest {
    /// Checked on the raw body before the other fields are type-checked.
    pub fn has_content(body: &serde_json::Value) -> bool {
        body.get("content")
            .is_some_and(|content| !content.is_null() && content.as_str() != Some(""))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New content, unchanged when omitted
    pub content: Option<String>,
    /// New importance flag, unchanged when omitted
    pub important: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
