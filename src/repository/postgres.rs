use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

use super::{StoreError, embedded::migrations};
use crate::models::{NewNote, Note, NoteChanges};

pub struct PgRepository {
    client: Client,
}

impl PgRepository {
    pub async fn new(database_dsn: &str) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), StoreError> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    pub async fn create_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let row = self
            .client
            .query_one(
                "INSERT INTO notes (id, content, important, date) VALUES ($1, $2, $3, $4) \
                 RETURNING id, content, important, date",
                &[&Uuid::new_v4(), &note.content, &note.important, &note.date],
            )
            .await?;

        Ok(note_from_row(&row))
    }

    pub async fn update_note(
        &self,
        id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, StoreError> {
        let row = self
            .client
            .query_opt(
                "UPDATE notes SET content = COALESCE($1, content), important = COALESCE($2, important) \
                 WHERE id = $3 RETURNING id, content, important, date",
                &[&changes.content, &changes.important, &id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }

    pub async fn get_one_note(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, content, important, date FROM notes WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    pub async fn get_all_notes(&self) -> Result<Vec<Note>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT id, content, important, date FROM notes ORDER BY seq",
                &[],
            )
            .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        content: row.get("content"),
        important: row.get("important"),
        date: row.get("date"),
    }
}
