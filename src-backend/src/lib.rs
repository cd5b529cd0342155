//! NPC Finder Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - commands: Access-checked operations for a signed-in user

use std::path::Path;

pub mod config;
pub mod domain;
pub mod repository;
pub mod commands;

use domain::DomainResult;
use repository::{init_db, init_in_memory, BoardRepository, DbState, SectionRepository, TaskRepository};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub boards: BoardRepository,
    pub sections: SectionRepository,
    pub tasks: TaskRepository,
}

impl AppState {
    pub fn new(db_state: DbState) -> Self {
        Self {
            boards: BoardRepository::new(db_state.conn.clone()),
            sections: SectionRepository::new(db_state.conn.clone()),
            tasks: TaskRepository::new(db_state.conn.clone()),
            db_state,
        }
    }

    /// Open the database file and build the state
    pub async fn open(db_path: &Path) -> DomainResult<Self> {
        Ok(Self::new(init_db(db_path).await?))
    }

    pub fn in_memory() -> DomainResult<Self> {
        Ok(Self::new(init_in_memory()?))
    }
}
