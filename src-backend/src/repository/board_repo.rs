//! Board Repository
//!
//! Boards plus their membership relation (sharing).

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::domain::{now_millis, Board, BoardAccess, BoardTemplate, DomainError, DomainResult};
use super::traits::Repository;

const BOARD_COLUMNS: &str =
    "id, owner_id, name, template, color, icon, is_visible, display_order, created_at";

/// SQLite implementation of the Board repository
pub struct BoardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BoardRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Boards the user owns or is a member of, in display order
    pub async fn list_for_user(&self, user_id: u32) -> DomainResult<Vec<Board>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM boards
             WHERE owner_id = ?1 OR id IN (SELECT board_id FROM board_members WHERE user_id = ?1)
             ORDER BY display_order, id",
            BOARD_COLUMNS
        ))?;
        let boards = stmt
            .query_map(params![user_id], row_to_board)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(boards)
    }

    /// Share a board. Sharing with the owner is rejected.
    pub async fn share(&self, board_id: u32, user_id: u32, access: BoardAccess) -> DomainResult<()> {
        if access == BoardAccess::Owner {
            return Err(DomainError::InvalidInput("Ownership cannot be shared".to_string()));
        }
        let conn = self.conn.lock().await;
        let owner = owner_of(&conn, board_id)?;
        if owner == user_id {
            return Err(DomainError::Conflict(format!("User {} already owns board {}", user_id, board_id)));
        }
        conn.execute(
            "INSERT INTO board_members (board_id, user_id, access) VALUES (?, ?, ?)
             ON CONFLICT(board_id, user_id) DO UPDATE SET access = excluded.access",
            params![board_id, user_id, access.as_str()],
        )?;
        Ok(())
    }

    pub async fn unshare(&self, board_id: u32, user_id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM board_members WHERE board_id = ? AND user_id = ?",
            params![board_id, user_id],
        )?;
        Ok(())
    }

    /// The user's access level on a board, or None if they cannot see it
    pub async fn access_for(&self, board_id: u32, user_id: u32) -> DomainResult<Option<BoardAccess>> {
        let conn = self.conn.lock().await;
        let owner = owner_of(&conn, board_id)?;
        if owner == user_id {
            return Ok(Some(BoardAccess::Owner));
        }
        let access = conn
            .query_row(
                "SELECT access FROM board_members WHERE board_id = ? AND user_id = ?",
                params![board_id, user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(access.map(|a| BoardAccess::from_str(&a)))
    }
}

fn owner_of(conn: &Connection, board_id: u32) -> DomainResult<u32> {
    conn.query_row("SELECT owner_id FROM boards WHERE id = ?", params![board_id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Board {} not found", board_id)))
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn create(&self, entity: &Board) -> DomainResult<Board> {
        if entity.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Board name is empty".to_string()));
        }
        let conn = self.conn.lock().await;
        let created_at = now_millis();
        conn.execute(
            "INSERT INTO boards (owner_id, name, template, color, icon, is_visible, display_order, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.owner_id,
                entity.name,
                entity.template.as_str(),
                entity.color,
                entity.icon,
                entity.is_visible,
                entity.display_order,
                created_at
            ],
        )?;
        Ok(Board {
            id: conn.last_insert_rowid() as u32,
            created_at,
            ..entity.clone()
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Board>> {
        let conn = self.conn.lock().await;
        let board = conn
            .query_row(
                &format!("SELECT {} FROM boards WHERE id = ?", BOARD_COLUMNS),
                params![id],
                row_to_board,
            )
            .optional()?;
        Ok(board)
    }

    async fn list(&self) -> DomainResult<Vec<Board>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM boards ORDER BY display_order, id", BOARD_COLUMNS))?;
        let boards = stmt.query_map([], row_to_board)?.collect::<Result<Vec<_>, _>>()?;
        Ok(boards)
    }

    async fn update(&self, entity: &Board) -> DomainResult<Board> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE boards SET name = ?, template = ?, color = ?, icon = ?, is_visible = ?, display_order = ? WHERE id = ?",
            params![
                entity.name,
                entity.template.as_str(),
                entity.color,
                entity.icon,
                entity.is_visible,
                entity.display_order,
                entity.id
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Board {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        // sections, tasks and memberships go with it via ON DELETE CASCADE
        conn.execute("DELETE FROM boards WHERE id = ?", params![id])?;
        Ok(())
    }
}

fn row_to_board(row: &Row) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        template: BoardTemplate::from_str(&row.get::<_, String>(3)?),
        color: row.get(4)?,
        icon: row.get(5)?,
        is_visible: row.get(6)?,
        display_order: row.get(7)?,
        created_at: row.get(8)?,
    })
}
