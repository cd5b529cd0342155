//! NPC Finder App
//!
//! Bootstraps settings, logging and storage, and wires the drag coordinator,
//! the board cache and the move resolver together for one open board.

use std::sync::Arc;
use std::time::Duration;

use board_dragdrop::{DragCoordinator, DropTarget};
use npc_finder_backend::config::{Settings, SettingsError};
use npc_finder_backend::domain::DomainError;
use npc_finder_backend::AppState;
use rolling_logger::{LogHandle, LoggerConfig, LoggerError};
use thiserror::Error;

use crate::commands::{ApiResult, LocalTaskApi, TaskApi};
use crate::context::AppContext;
use crate::models::{Section, Task};
use crate::resolver::MoveResolver;
use crate::store::BoardCache;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Logger(#[from] LoggerError),
    #[error("cannot open storage: {0}")]
    Storage(#[from] DomainError),
}

/// A running application: storage, logging and the shared context
pub struct App {
    pub settings: Settings,
    pub state: Arc<AppState>,
    pub context: AppContext,
    /// None when a global subscriber was already installed by the host
    pub log: Option<LogHandle>,
}

impl App {
    /// Install logging, then open the database
    pub async fn bootstrap(settings: Settings) -> Result<Self, AppError> {
        let log_config = LoggerConfig {
            max_bytes: settings.logging.max_bytes,
            max_files: settings.logging.max_files,
            ..LoggerConfig::default()
        };
        let log = match rolling_logger::init_logger_with(&settings.logging.dir, &settings.logging.app_name, log_config) {
            Ok(handle) => Some(handle),
            Err(LoggerError::Init(reason)) => {
                tracing::warn!(%reason, "keeping the existing log subscriber");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let state = Arc::new(AppState::open(&settings.database.path).await?);
        tracing::info!(db = %settings.database.path.display(), grace_ms = settings.drag.grace_ms, "app started");

        Ok(Self {
            settings,
            state,
            context: AppContext::new(Arc::new(BoardCache::new())),
            log,
        })
    }

    /// Persistence port acting as `user_id`
    pub fn api_for(&self, user_id: u32) -> Arc<dyn TaskApi> {
        Arc::new(LocalTaskApi::new(self.state.clone(), user_id))
    }

    /// Open a board for `user_id` and load its tasks into the cache
    pub async fn open_board(&self, user_id: u32, board_id: u32) -> ApiResult<BoardController> {
        let controller = BoardController::new(
            self.context.clone(),
            self.api_for(user_id),
            board_id,
            self.settings.drag.grace(),
        );
        controller.load().await?;
        Ok(controller)
    }
}

/// Drag and drop on one open board
pub struct BoardController {
    board_id: u32,
    dnd: DragCoordinator,
    resolver: MoveResolver,
    context: AppContext,
}

impl BoardController {
    pub fn new(context: AppContext, api: Arc<dyn TaskApi>, board_id: u32, grace: Duration) -> Self {
        Self {
            board_id,
            dnd: DragCoordinator::new(grace),
            resolver: MoveResolver::new(context.cache.clone(), api),
            context,
        }
    }

    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.dnd
    }

    /// Fetch the board's tasks; the response replaces whatever is cached
    pub async fn load(&self) -> ApiResult<Vec<Task>> {
        let tasks = self.resolver.api().list_tasks(self.board_id).await?;
        tracing::debug!(board_id = self.board_id, count = tasks.len(), "board loaded");
        self.context.cache.replace_board(self.board_id, tasks);
        Ok(self.tasks())
    }

    /// Reload only if the cache was invalidated
    pub async fn refresh_if_stale(&self) -> ApiResult<bool> {
        if !self.context.cache.is_stale(self.board_id) {
            return Ok(false);
        }
        self.load().await?;
        Ok(true)
    }

    pub async fn sections(&self) -> ApiResult<Vec<Section>> {
        self.resolver.api().list_sections(self.board_id).await
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.context.cache.get_tasks_for_board(self.board_id)
    }

    pub fn column(&self, section_id: Option<u32>) -> Vec<Task> {
        self.context.cache.tasks_in_section(self.board_id, section_id)
    }

    pub fn drag_start(&self, task_id: u32) {
        self.dnd.start_drag(task_id);
    }

    pub fn drag_over(&self, target: DropTarget) {
        self.dnd.drag_over(target);
    }

    pub fn drag_end(&self) {
        self.dnd.end_drag();
    }

    /// Drop event. Ok(None) when there was no live drag or the drop changes nothing.
    pub async fn drop_on(&self, target: DropTarget) -> ApiResult<Option<Task>> {
        match self.dnd.drop_on(target) {
            Some((task_id, target)) => self.resolver.resolve(self.board_id, task_id, target).await,
            None => Ok(None),
        }
    }

    /// Pointer released over whatever is hovered
    pub async fn release(&self) -> ApiResult<Option<Task>> {
        match self.dnd.release() {
            Some((task_id, target)) => self.resolver.resolve(self.board_id, task_id, target).await,
            None => Ok(None),
        }
    }
}
