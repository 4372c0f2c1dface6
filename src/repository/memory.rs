use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewNote, Note, NoteChanges};

/// In-process store. Notes keep insertion order.
#[derive(Default)]
pub struct MemoryRepository {
    notes: RwLock<Vec<Note>>,
}

impl MemoryRepository {
    pub async fn create_note(&self, note: NewNote) -> Note {
        let note = Note {
            id: Uuid::new_v4(),
            content: note.content,
            important: note.important,
            date: note.date,
        };
        self.notes.write().await.push(note.clone());
        note
    }

    pub async fn update_note(&self, id: Uuid, changes: NoteChanges) -> Option<Note> {
        let mut notes = self.notes.write().await;
        let note = notes.iter_mut().find(|note| note.id == id)?;
        changes.apply(note);
        Some(note.clone())
    }

    pub async fn delete_note(&self, id: Uuid) -> bool {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|note| note.id != id);
        notes.len() != before
    }

    pub async fn get_one_note(&self, id: Uuid) -> Option<Note> {
        self.notes
            .read()
            .await
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    pub async fn get_all_notes(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }
}
