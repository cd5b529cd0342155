//! Task Lifecycle Operations
//!
//! Status changes, repeat completion, archival and timers.

use async_trait::async_trait;
use chrono::Local;

use crate::domain::{now_millis, DomainError, DomainResult, Task, TaskStatus};
use super::task_repo::{load_task, write_task, TaskRepository};

#[async_trait]
pub trait TaskLifecycleOperations {
    async fn set_status(&self, id: u32, status: TaskStatus) -> DomainResult<Task>;

    /// Complete a task; repeating tasks are rescheduled instead of closed
    async fn complete(&self, id: u32) -> DomainResult<Task>;

    /// Soft delete
    async fn archive(&self, id: u32) -> DomainResult<Task>;

    async fn start_timer(&self, id: u32) -> DomainResult<Task>;

    async fn stop_timer(&self, id: u32) -> DomainResult<Task>;
}

impl TaskRepository {
    /// Load, mutate and store one task under a single lock
    async fn modify<F>(&self, id: u32, f: F) -> DomainResult<Task>
    where
        F: FnOnce(&mut Task, i64) + Send,
    {
        let conn = self.conn.lock().await;
        let mut task = load_task(&conn, id)?.ok_or_else(|| DomainError::NotFound(format!("Task {} not found", id)))?;
        f(&mut task, now_millis());
        write_task(&conn, &task)?;
        Ok(task)
    }
}

#[async_trait]
impl TaskLifecycleOperations for TaskRepository {
    async fn set_status(&self, id: u32, status: TaskStatus) -> DomainResult<Task> {
        self.modify(id, |task, now| task.set_status(status, now)).await
    }

    async fn complete(&self, id: u32) -> DomainResult<Task> {
        let today = Local::now().date_naive();
        let task = self
            .modify(id, |task, now| {
                task.complete(now, today);
            })
            .await?;
        if task.repeat.is_some() {
            tracing::info!(task_id = id, due = ?task.due_date, "repeating task rescheduled");
        }
        Ok(task)
    }

    async fn archive(&self, id: u32) -> DomainResult<Task> {
        self.modify(id, |task, now| task.set_status(TaskStatus::Archived, now)).await
    }

    async fn start_timer(&self, id: u32) -> DomainResult<Task> {
        self.modify(id, |task, now| task.start_timer(now)).await
    }

    async fn stop_timer(&self, id: u32) -> DomainResult<Task> {
        self.modify(id, |task, now| task.stop_timer(now)).await
    }
}
