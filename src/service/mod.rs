use chrono::Utc;

use std::sync::Arc;

use crate::{
    dto::{NoteResponse, UpdateNoteRequest},
    models::{NewNote, NoteChanges},
    repository::{Repository, StoreError},
};

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<Repository>,
}

impl NoteService {
    pub const fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Content must already be validated; the creation date is set here.
    pub async fn create_note(
        &self,
        content: String,
        important: bool,
    ) -> Result<NoteResponse, StoreError> {
        self.repo
            .create_note(NewNote {
                content,
                important,
                date: Utc::now(),
            })
            .await
            .map(NoteResponse::from)
    }

    pub async fn update_note(
        &self,
        id: &str,
        request: UpdateNoteRequest,
    ) -> Result<Option<NoteResponse>, StoreError> {
        let changes = NoteChanges {
            content: request.content,
            important: request.important,
        };

        self.repo
            .update_note(id, changes)
            .await
            .map(|note| note.map(NoteResponse::from))
    }

    pub async fn delete_note(&self, id: &str) -> Result<bool, StoreError> {
        self.repo.delete_note(id).await
    }

    pub async fn get_one_note(&self, id: &str) -> Result<Option<NoteResponse>, StoreError> {
        self.repo
            .get_one_note(id)
            .await
            .map(|note| note.map(NoteResponse::from))
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, StoreError> {
        self.repo
            .get_all_notes()
            .await
            .map(|notes| notes.into_iter().map(NoteResponse::from).collect())
    }
}
