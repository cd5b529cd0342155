//! Persistence Port
//!
//! The board subsystem talks to storage only through `TaskApi`, organized by domain.

mod task;

use async_trait::async_trait;
use thiserror::Error;

use npc_finder_backend::domain::DomainError;

use crate::models::{Section, Task};

pub use task::*;

/// Errors surfaced by a persistence call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("transport error: {0}")]
    Transport(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::PermissionDenied(msg) => ApiError::PermissionDenied(msg),
            DomainError::InvalidInput(msg) | DomainError::Conflict(msg) => ApiError::Validation(msg),
            DomainError::Internal(msg) => ApiError::Transport(msg),
        }
    }
}

/// Storage operations the board subsystem needs
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Place a task in a section (None = unsectioned) at an order; returns the stored record
    async fn move_task(&self, task_id: u32, section_id: Option<u32>, order: i32) -> ApiResult<Task>;

    /// Place a task after every other task of a section; returns the stored record
    async fn append_task(&self, task_id: u32, section_id: Option<u32>) -> ApiResult<Task>;

    async fn list_tasks(&self, board_id: u32) -> ApiResult<Vec<Task>>;

    async fn list_sections(&self, board_id: u32) -> ApiResult<Vec<Section>>;
}
