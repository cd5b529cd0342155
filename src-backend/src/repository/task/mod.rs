//! Task Repository Module
//!
//! This module provides task repository functionality split into specialized sub-modules:
//! - task_repo: Core CRUD operations
//! - task_positioning: Column order and moves
//! - task_lifecycle: Status, repeat completion, archival, timers
//! - task_board: Board, column and inbox listings

mod task_repo;
mod task_positioning;
mod task_lifecycle;
mod task_board;

pub use task_repo::TaskRepository;

// Re-export all operation traits so they can be used by importing TaskRepository
pub use task_positioning::TaskPositioningOperations;
pub use task_lifecycle::TaskLifecycleOperations;
pub use task_board::TaskBoardOperations;
