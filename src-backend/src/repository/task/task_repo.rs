//! Task Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Task CRUD operations.
//! Specialized operations are in separate modules:
//! - task_positioning: Column order and moves
//! - task_lifecycle: Status, repeat completion, archive, timers
//! - task_board: Board and inbox listings

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::domain::{
    now_millis, BoardTemplate, DomainError, DomainResult, Priority, Task, TaskStatus,
};
use super::super::traits::Repository;

pub(super) const TASK_COLUMNS: &str = "id, owner_id, board_id, section_id, title, description, status, priority, \
     due_date, tags, item_data, display_order, repeat_rule, timer, reminder_at, created_at, updated_at, \
     completed_at, last_completed_at";

/// SQLite implementation of Task repository
pub struct TaskRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl TaskRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<Task> for TaskRepository {
    /// Inserts at the end of the task's column; the incoming display_order is ignored
    async fn create(&self, entity: &Task) -> DomainResult<Task> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Task title is empty".to_string()));
        }
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        if let Some(board_id) = entity.board_id {
            let template = board_template(&tx, board_id)?;
            if !entity.item_data.fits(template) {
                return Err(DomainError::InvalidInput(format!(
                    "A {} payload does not belong on a {} board",
                    entity.item_data.template().as_str(),
                    template.as_str()
                )));
            }
            if let Some(section_id) = entity.section_id {
                ensure_section_on_board(&tx, section_id, board_id)?;
            }
        } else if entity.section_id.is_some() {
            return Err(DomainError::InvalidInput("Inbox tasks cannot have a section".to_string()));
        }

        let now = now_millis();
        let mut task = entity.clone();
        task.display_order = next_position(&tx, task.board_id, task.section_id)?;
        task.created_at = now;
        task.updated_at = now;
        if task.status == TaskStatus::Done && task.completed_at.is_none() {
            task.completed_at = Some(now);
        } else if task.status != TaskStatus::Done {
            task.completed_at = None;
        }

        tx.execute(
            "INSERT INTO tasks (owner_id, board_id, section_id, title, description, status, priority, due_date, \
             tags, item_data, display_order, repeat_rule, timer, reminder_at, created_at, updated_at, \
             completed_at, last_completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                task.owner_id,
                task.board_id,
                task.section_id,
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.map(|p| p.as_str()),
                task.due_date,
                serde_json::to_string(&task.tags)?,
                serde_json::to_string(&task.item_data)?,
                task.display_order,
                task.repeat.map(|r| serde_json::to_string(&r)).transpose()?,
                task.timer.map(|t| serde_json::to_string(&t)).transpose()?,
                task.reminder_at,
                task.created_at,
                task.updated_at,
                task.completed_at,
                task.last_completed_at
            ],
        )?;
        task.id = tx.last_insert_rowid() as u32;
        tx.commit()?;
        Ok(task)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Task>> {
        let conn = self.conn.lock().await;
        load_task(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Task>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY board_id NULLS FIRST, section_id NULLS FIRST, display_order, created_at, id",
            TASK_COLUMNS
        ))?;
        let tasks = stmt.query_map([], row_to_task)?.collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Writes the editable fields. Board, section and order change only via moves.
    async fn update(&self, entity: &Task) -> DomainResult<Task> {
        let conn = self.conn.lock().await;
        let existing = load_task(&conn, entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", entity.id)))?;
        if let Some(board_id) = existing.board_id {
            let template = board_template(&conn, board_id)?;
            if !entity.item_data.fits(template) {
                return Err(DomainError::InvalidInput(format!(
                    "A {} payload does not belong on a {} board",
                    entity.item_data.template().as_str(),
                    template.as_str()
                )));
            }
        }

        let mut task = entity.clone();
        task.board_id = existing.board_id;
        task.section_id = existing.section_id;
        task.display_order = existing.display_order;
        task.created_at = existing.created_at;
        // route through set_status so completed_at follows the status
        let status = task.status;
        task.status = existing.status;
        task.completed_at = existing.completed_at;
        task.set_status(status, now_millis());

        write_task(&conn, &task)?;
        Ok(task)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM tasks WHERE id = ?", params![id])?;
        Ok(())
    }
}

/// Load one task by ID on an already locked connection
pub(super) fn load_task(conn: &Connection, id: u32) -> DomainResult<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
            params![id],
            row_to_task,
        )
        .optional()?;
    Ok(task)
}

/// Persist every mutable column of a task
pub(super) fn write_task(conn: &Connection, task: &Task) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE tasks SET owner_id = ?, board_id = ?, section_id = ?, title = ?, description = ?, status = ?, \
         priority = ?, due_date = ?, tags = ?, item_data = ?, display_order = ?, repeat_rule = ?, timer = ?, \
         reminder_at = ?, updated_at = ?, completed_at = ?, last_completed_at = ? WHERE id = ?",
        params![
            task.owner_id,
            task.board_id,
            task.section_id,
            task.title,
            task.description,
            task.status.as_str(),
            task.priority.map(|p| p.as_str()),
            task.due_date,
            serde_json::to_string(&task.tags)?,
            serde_json::to_string(&task.item_data)?,
            task.display_order,
            task.repeat.map(|r| serde_json::to_string(&r)).transpose()?,
            task.timer.map(|t| serde_json::to_string(&t)).transpose()?,
            task.reminder_at,
            task.updated_at,
            task.completed_at,
            task.last_completed_at,
            task.id
        ],
    )?;
    if changed == 0 {
        return Err(DomainError::NotFound(format!("Task {} not found", task.id)));
    }
    Ok(())
}

/// Next free position at the end of a (board, section) column
pub(super) fn next_position(conn: &Connection, board_id: Option<u32>, section_id: Option<u32>) -> DomainResult<i32> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(display_order), -1) + 1 FROM tasks
         WHERE board_id IS ? AND section_id IS ? AND status != ?",
        params![board_id, section_id, TaskStatus::Archived.as_str()],
        |row| row.get::<_, i32>(0),
    )?;
    Ok(next)
}

pub(super) fn board_template(conn: &Connection, board_id: u32) -> DomainResult<BoardTemplate> {
    conn.query_row("SELECT template FROM boards WHERE id = ?", params![board_id], |row| {
        row.get::<_, String>(0)
    })
    .optional()?
    .map(|t| BoardTemplate::from_str(&t))
    .ok_or_else(|| DomainError::NotFound(format!("Board {} not found", board_id)))
}

pub(super) fn ensure_section_on_board(conn: &Connection, section_id: u32, board_id: u32) -> DomainResult<()> {
    let owner_board = conn
        .query_row("SELECT board_id FROM sections WHERE id = ?", params![section_id], |row| {
            row.get::<_, u32>(0)
        })
        .optional()?;
    match owner_board {
        Some(b) if b == board_id => Ok(()),
        Some(b) => Err(DomainError::InvalidInput(format!(
            "Section {} belongs to board {}, not board {}",
            section_id, b, board_id
        ))),
        None => Err(DomainError::InvalidInput(format!("Section {} does not exist", section_id))),
    }
}

fn json_col<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_json_col<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

/// Convert a database row to Task
pub(super) fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        board_id: row.get(2)?,
        section_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        status: TaskStatus::from_str(&row.get::<_, String>(6)?),
        priority: row.get::<_, Option<String>>(7)?.as_deref().and_then(Priority::parse),
        due_date: row.get(8)?,
        tags: json_col(row, 9)?,
        item_data: json_col(row, 10)?,
        display_order: row.get(11)?,
        repeat: opt_json_col(row, 12)?,
        timer: opt_json_col(row, 13)?,
        reminder_at: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
        completed_at: row.get(17)?,
        last_completed_at: row.get(18)?,
    })
}
