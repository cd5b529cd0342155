//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod board_repo;
mod section_repo;
mod task;

#[cfg(test)]
mod tests;

pub use traits::Repository;
pub use db::{init_db, init_in_memory, DbState};
pub use board_repo::BoardRepository;
pub use section_repo::SectionRepository;
pub use task::{TaskBoardOperations, TaskLifecycleOperations, TaskPositioningOperations, TaskRepository};
