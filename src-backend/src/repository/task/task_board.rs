//! Task Board Operations
//!
//! Listings scoped to a board, a column, or the inbox.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Task, TaskStatus};
use super::task_repo::{row_to_task, TaskRepository, TASK_COLUMNS};

#[async_trait]
pub trait TaskBoardOperations {
    /// All non-archived tasks on a board, in render order per column
    async fn list_by_board(&self, board_id: u32) -> DomainResult<Vec<Task>>;

    /// One column, in render order
    async fn list_in_section(&self, board_id: u32, section_id: Option<u32>) -> DomainResult<Vec<Task>>;

    /// The user's unboarded tasks
    async fn list_inbox(&self, owner_id: u32) -> DomainResult<Vec<Task>>;
}

#[async_trait]
impl TaskBoardOperations for TaskRepository {
    async fn list_by_board(&self, board_id: u32) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE board_id = ? AND status != ?
             ORDER BY section_id NULLS FIRST, display_order, created_at, id",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(params![board_id, TaskStatus::Archived.as_str()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    async fn list_in_section(&self, board_id: u32, section_id: Option<u32>) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE board_id = ? AND section_id IS ? AND status != ?
             ORDER BY display_order, created_at, id",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(params![board_id, section_id, TaskStatus::Archived.as_str()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    async fn list_inbox(&self, owner_id: u32) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE board_id IS NULL AND owner_id = ? AND status != ?
             ORDER BY display_order, created_at, id",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(params![owner_id, TaskStatus::Archived.as_str()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}
