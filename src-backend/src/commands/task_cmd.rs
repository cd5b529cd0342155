//! Task Commands
//!
//! Task operations as seen by a signed-in user. Every command checks the
//! caller's access to the owning board before touching storage.

use crate::domain::{DomainError, DomainResult, Task, TaskStatus};
use crate::repository::{
    Repository, TaskBoardOperations, TaskLifecycleOperations, TaskPositioningOperations,
};
use crate::AppState;

use super::board_cmd::{require_read, require_write};

/// Load a task the user may modify
async fn writable_task(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<Task> {
    let task = state
        .tasks
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Task {} not found", task_id)))?;
    match task.board_id {
        Some(board_id) => {
            require_write(state, user_id, board_id).await?;
        }
        None if task.owner_id == user_id => {}
        None => return Err(DomainError::PermissionDenied(format!("Task {} belongs to another user", task_id))),
    }
    Ok(task)
}

/// Create a task. Boarded tasks need write access; inbox tasks belong to the caller.
pub async fn create_task(state: &AppState, user_id: u32, mut task: Task) -> DomainResult<Task> {
    if let Some(board_id) = task.board_id {
        require_write(state, user_id, board_id).await?;
    }
    task.owner_id = user_id;
    state.tasks.create(&task).await
}

/// All open tasks of a board
pub async fn list_tasks(state: &AppState, user_id: u32, board_id: u32) -> DomainResult<Vec<Task>> {
    require_read(state, user_id, board_id).await?;
    state.tasks.list_by_board(board_id).await
}

pub async fn list_inbox(state: &AppState, user_id: u32) -> DomainResult<Vec<Task>> {
    state.tasks.list_inbox(user_id).await
}

/// Reassign a task's section and order; returns the canonical stored record
pub async fn move_task(
    state: &AppState,
    user_id: u32,
    task_id: u32,
    section_id: Option<u32>,
    order: i32,
) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.move_to(task_id, section_id, order).await
}

/// Put a task at the end of a section
pub async fn append_task(state: &AppState, user_id: u32, task_id: u32, section_id: Option<u32>) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.append_to(task_id, section_id).await
}

/// Edit title, description, priority, due date, tags, payload and status
pub async fn update_task(state: &AppState, user_id: u32, task: Task) -> DomainResult<Task> {
    writable_task(state, user_id, task.id).await?;
    state.tasks.update(&task).await
}

pub async fn set_task_status(state: &AppState, user_id: u32, task_id: u32, status: TaskStatus) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.set_status(task_id, status).await
}

/// Flip between done and todo, completing repeating tasks through their schedule
pub async fn toggle_task(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<Task> {
    let task = writable_task(state, user_id, task_id).await?;
    if task.status == TaskStatus::Done {
        state.tasks.set_status(task_id, TaskStatus::Todo).await
    } else {
        state.tasks.complete(task_id).await
    }
}

pub async fn archive_task(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.archive(task_id).await
}

/// Hard delete
pub async fn delete_task(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<()> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.delete(task_id).await
}

pub async fn start_task_timer(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.start_timer(task_id).await
}

pub async fn stop_task_timer(state: &AppState, user_id: u32, task_id: u32) -> DomainResult<Task> {
    writable_task(state, user_id, task_id).await?;
    state.tasks.stop_timer(task_id).await
}
