//! Task Positioning Operations
//!
//! Operations for managing task order within a board column. Archived tasks
//! keep their stored order but take no part in a column's positions.

use async_trait::async_trait;
use rusqlite::{params, Connection, Transaction};

use crate::domain::{now_millis, DomainError, DomainResult, Task, TaskStatus};
use super::task_repo::{ensure_section_on_board, load_task, next_position};

/// Trait for task positioning operations
#[async_trait]
pub trait TaskPositioningOperations {
    /// Next position at the end of a column
    async fn get_next_position(&self, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<i32>;

    /// Move a task to a section (None = unsectioned) at `position`, making room and
    /// reindexing the destination column. Returns the stored task.
    async fn move_to(&self, id: u32, section_id: Option<u32>, position: i32) -> DomainResult<Task>;

    /// Move a task to the end of a section, after every other open task there
    async fn append_to(&self, id: u32, section_id: Option<u32>) -> DomainResult<Task>;

    /// Reindex a column to be sequential (0, 1, 2, ...)
    async fn reindex_section(&self, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<()>;
}

#[async_trait]
impl TaskPositioningOperations for super::task_repo::TaskRepository {
    async fn get_next_position(&self, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<i32> {
        let conn = self.conn.lock().await;
        next_position(&conn, board_id, section_id)
    }

    async fn move_to(&self, id: u32, section_id: Option<u32>, position: i32) -> DomainResult<Task> {
        if position < 0 {
            return Err(DomainError::InvalidInput(format!("Position {} is negative", position)));
        }
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let task = movable_task(&tx, id, section_id)?;

        // Shift existing tasks at the target position down
        tx.execute(
            "UPDATE tasks SET display_order = display_order + 1
             WHERE board_id IS ? AND section_id IS ? AND display_order >= ? AND id != ? AND status != ?",
            params![task.board_id, section_id, position, id, TaskStatus::Archived.as_str()],
        )?;

        // Move the task
        tx.execute(
            "UPDATE tasks SET section_id = ?, display_order = ?, updated_at = ? WHERE id = ?",
            params![section_id, position, now_millis(), id],
        )?;

        reindex_column(&tx, task.board_id, section_id)?;

        let moved = load_task(&tx, id)?.ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        tx.commit()?;
        tracing::debug!(task_id = id, ?section_id, requested = position, stored = moved.display_order, "task moved");
        Ok(moved)
    }

    async fn append_to(&self, id: u32, section_id: Option<u32>) -> DomainResult<Task> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let task = movable_task(&tx, id, section_id)?;

        // Compact the other tasks first so the end is their count
        let others = column_ids(&tx, task.board_id, section_id, Some(id))?;
        write_positions(&tx, &others)?;

        tx.execute(
            "UPDATE tasks SET section_id = ?, display_order = ?, updated_at = ? WHERE id = ?",
            params![section_id, others.len() as i32, now_millis(), id],
        )?;

        let moved = load_task(&tx, id)?.ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        tx.commit()?;
        tracing::debug!(task_id = id, ?section_id, stored = moved.display_order, "task appended");
        Ok(moved)
    }

    async fn reindex_section(&self, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        reindex_column(&tx, board_id, section_id)?;
        tx.commit()?;
        Ok(())
    }
}

/// Load the task and check the destination section belongs to its board
fn movable_task(tx: &Transaction<'_>, id: u32, section_id: Option<u32>) -> DomainResult<Task> {
    let task = load_task(tx, id)?.ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
    match (task.board_id, section_id) {
        (Some(board_id), Some(sid)) => ensure_section_on_board(tx, sid, board_id)?,
        (None, Some(_)) => {
            return Err(DomainError::InvalidInput("Inbox tasks cannot be moved into a section".to_string()))
        }
        _ => {}
    }
    Ok(task)
}

/// Open tasks of a column in render order, optionally leaving one out
fn column_ids(
    conn: &Connection,
    board_id: Option<u32>,
    section_id: Option<u32>,
    except: Option<u32>,
) -> DomainResult<Vec<u32>> {
    let ids: Vec<u32> = conn
        .prepare(
            "SELECT id FROM tasks WHERE board_id IS ? AND section_id IS ? AND status != ?
             ORDER BY display_order, created_at, id",
        )?
        .query_map(params![board_id, section_id, TaskStatus::Archived.as_str()], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(ids.into_iter().filter(|id| Some(*id) != except).collect())
}

fn write_positions(conn: &Connection, ids: &[u32]) -> DomainResult<()> {
    let mut update = conn.prepare("UPDATE tasks SET display_order = ? WHERE id = ? AND display_order != ?")?;
    for (new_pos, id) in ids.iter().enumerate() {
        update.execute(params![new_pos as i32, *id, new_pos as i32])?;
    }
    Ok(())
}

/// Rewrite a column's display_order to 0..n in render order
fn reindex_column(conn: &Connection, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<()> {
    write_positions(conn, &column_ids(conn, board_id, section_id, None)?)
}
