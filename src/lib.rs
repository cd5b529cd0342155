//! NPC Finder
//!
//! Kanban boards with drag-and-drop reordering over an optimistic task cache.
//! - store: per-board task cache with snapshot, commit and rollback
//! - mutation: optimistic change settled by a persistence call
//! - resolver: drop target to section + order, one call per drop
//! - app: drag coordinator, cache and resolver wired for an open board

pub mod app;
pub mod commands;
pub mod context;
pub mod models;
pub mod mutation;
pub mod resolver;
pub mod store;

pub use app::{App, AppError, BoardController};
pub use board_dragdrop::{DragCoordinator, DropTarget};
pub use commands::{ApiError, ApiResult, LocalTaskApi, TaskApi};
pub use context::{AppContext, ScrollGuard, ScrollLock};
pub use models::TaskPatch;
pub use resolver::{MovePlan, MoveResolver};
pub use store::{BoardCache, Snapshot};
