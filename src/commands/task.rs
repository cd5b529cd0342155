//! Local Task Commands
//!
//! `TaskApi` served by the in-process SQLite backend, acting as one user.

use std::sync::Arc;

use async_trait::async_trait;

use npc_finder_backend::commands as backend;
use npc_finder_backend::AppState;

use super::{ApiResult, TaskApi};
use crate::models::{Section, Task};

#[derive(Clone)]
pub struct LocalTaskApi {
    state: Arc<AppState>,
    user_id: u32,
}

impl LocalTaskApi {
    pub fn new(state: Arc<AppState>, user_id: u32) -> Self {
        Self { state, user_id }
    }
}

#[async_trait]
impl TaskApi for LocalTaskApi {
    async fn move_task(&self, task_id: u32, section_id: Option<u32>, order: i32) -> ApiResult<Task> {
        Ok(backend::move_task(&self.state, self.user_id, task_id, section_id, order).await?)
    }

    async fn append_task(&self, task_id: u32, section_id: Option<u32>) -> ApiResult<Task> {
        Ok(backend::append_task(&self.state, self.user_id, task_id, section_id).await?)
    }

    async fn list_tasks(&self, board_id: u32) -> ApiResult<Vec<Task>> {
        Ok(backend::list_tasks(&self.state, self.user_id, board_id).await?)
    }

    async fn list_sections(&self, board_id: u32) -> ApiResult<Vec<Section>> {
        Ok(backend::list_sections(&self.state, self.user_id, board_id).await?)
    }
}
