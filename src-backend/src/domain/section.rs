//! Section Entity
//!
//! A named column within a board.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    pub board_id: u32,
    pub name: String,
    /// Position among the board's columns
    pub display_order: i32,
}

impl Section {
    pub fn new(id: u32, board_id: u32, name: String, display_order: i32) -> Self {
        Self {
            id,
            board_id,
            name,
            display_order,
        }
    }
}

impl Entity for Section {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// What happens to a section's tasks when the section is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionDeletion {
    /// Tasks stay on the board with no section
    Unsection,
    /// Tasks are deleted along with the section (explicitly confirmed by the user)
    Cascade,
}
