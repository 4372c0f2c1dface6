mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use uuid::Uuid;

use crate::models::{NewNote, Note, NoteChanges};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("malformed note id '{0}'")]
    MalformedId(String),

    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),
}

/// Note storage. Ids come in as the raw path segment; each call parses it first.
pub enum Repository {
    Postgres(PgRepository),
    Memory(MemoryRepository),
}

impl Repository {
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    pub async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        match self {
            Self::Postgres(repo) => repo.create_note(note).await,
            Self::Memory(repo) => Ok(repo.create_note(note).await),
        }
    }

    pub async fn update_note(
        &self,
        id: &str,
        changes: NoteChanges,
    ) -> Result<Option<Note>, StoreError> {
        let id = parse_id(id)?;
        match self {
            Self::Postgres(repo) => repo.update_note(id, changes).await,
            Self::Memory(repo) => Ok(repo.update_note(id, changes).await),
        }
    }

    pub async fn delete_note(&self, id: &str) -> Result<bool, StoreError> {
        let id = parse_id(id)?;
        match self {
            Self::Postgres(repo) => repo.delete_note(id).await,
            Self::Memory(repo) => Ok(repo.delete_note(id).await),
        }
    }

    pub async fn get_one_note(&self, id: &str) -> Result<Option<Note>, StoreError> {
        let id = parse_id(id)?;
        match self {
            Self::Postgres(repo) => repo.get_one_note(id).await,
            Self::Memory(repo) => Ok(repo.get_one_note(id).await),
        }
    }

    pub async fn get_all_notes(&self) -> Result<Vec<Note>, StoreError> {
        match self {
            Self::Postgres(repo) => repo.get_all_notes().await,
            Self::Memory(repo) => Ok(repo.get_all_notes().await),
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("not-an-id").unwrap_err();
        assert!(matches!(err, StoreError::MalformedId(ref s) if s == "not-an-id"));
    }

    #[tokio::test]
    async fn malformed_id_fails_before_reaching_backend() {
        let repo = Repository::Memory(MemoryRepository::default());
        assert!(matches!(
            repo.get_one_note("123").await,
            Err(StoreError::MalformedId(_))
        ));
        assert!(matches!(
            repo.delete_note("123").await,
            Err(StoreError::MalformedId(_))
        ));
        assert!(matches!(
            repo.update_note("123", NoteChanges::default()).await,
            Err(StoreError::MalformedId(_))
        ));
    }
}
