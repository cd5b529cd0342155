//! Section Repository
//!
//! Board columns. Deleting a column either unsections or deletes its tasks.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::domain::{now_millis, DomainError, DomainResult, Section, SectionDeletion};
use super::traits::Repository;

/// SQLite implementation of the Section repository
pub struct SectionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SectionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Columns of a board, ordered
    pub async fn list_by_board(&self, board_id: u32) -> DomainResult<Vec<Section>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, board_id, name, display_order FROM sections WHERE board_id = ? ORDER BY display_order, id",
        )?;
        let sections = stmt
            .query_map(params![board_id], row_to_section)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    /// Delete a column, returning how many tasks were affected
    pub async fn delete_with(&self, id: u32, mode: SectionDeletion) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let affected = match mode {
            SectionDeletion::Unsection => tx.execute(
                "UPDATE tasks SET section_id = NULL, updated_at = ? WHERE section_id = ?",
                params![now_millis(), id],
            )?,
            SectionDeletion::Cascade => tx.execute("DELETE FROM tasks WHERE section_id = ?", params![id])?,
        };
        let removed = tx.execute("DELETE FROM sections WHERE id = ?", params![id])?;
        if removed == 0 {
            return Err(DomainError::NotFound(format!("Section {} not found", id)));
        }
        tx.commit()?;
        Ok(affected)
    }
}

#[async_trait]
impl Repository<Section> for SectionRepository {
    async fn create(&self, entity: &Section) -> DomainResult<Section> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sections (board_id, name, display_order) VALUES (?, ?, ?)",
            params![entity.board_id, entity.name, entity.display_order],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DomainError::NotFound(format!("Board {} not found", entity.board_id))
            }
            other => other.into(),
        })?;
        Ok(Section {
            id: conn.last_insert_rowid() as u32,
            ..entity.clone()
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Section>> {
        let conn = self.conn.lock().await;
        let section = conn
            .query_row(
                "SELECT id, board_id, name, display_order FROM sections WHERE id = ?",
                params![id],
                row_to_section,
            )
            .optional()?;
        Ok(section)
    }

    async fn list(&self) -> DomainResult<Vec<Section>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, board_id, name, display_order FROM sections ORDER BY board_id, display_order, id")?;
        let sections = stmt.query_map([], row_to_section)?.collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    async fn update(&self, entity: &Section) -> DomainResult<Section> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE sections SET name = ?, display_order = ? WHERE id = ?",
            params![entity.name, entity.display_order, entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Section {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.delete_with(id, SectionDeletion::Unsection).await.map(|_| ())
    }
}

fn row_to_section(row: &Row) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        board_id: row.get(1)?,
        name: row.get(2)?,
        display_order: row.get(3)?,
    })
}
