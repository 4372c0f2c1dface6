use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub important: bool,
    pub date: DateTime<Utc>,
}

/// Fields a new note is inserted with. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub content: String,
    pub important: bool,
    pub date: DateTime<Utc>,
}

/// Partial update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub content: Option<String>,
    pub important: Option<bool>,
}

impl NoteChanges {
    pub fn apply(self, note: &mut Note) {
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(important) = self.important {
            note.important = important;
        }
    }
}
