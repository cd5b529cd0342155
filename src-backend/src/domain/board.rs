//! Board Entity
//!
//! A named collection of tasks laid out according to a template.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Template type determines the shape of each task's `item_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardTemplate {
    #[default]
    Kanban,
    Grocery,
    Recipe,
    JobTracker,
    Markdown,
    Custom,
}

impl BoardTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardTemplate::Kanban => "kanban",
            BoardTemplate::Grocery => "grocery",
            BoardTemplate::Recipe => "recipe",
            BoardTemplate::JobTracker => "job_tracker",
            BoardTemplate::Markdown => "markdown",
            BoardTemplate::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "grocery" => BoardTemplate::Grocery,
            "recipe" => BoardTemplate::Recipe,
            "job_tracker" => BoardTemplate::JobTracker,
            "markdown" => BoardTemplate::Markdown,
            "custom" => BoardTemplate::Custom,
            _ => BoardTemplate::Kanban,
        }
    }
}

/// What a user may do on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardAccess {
    Owner,
    ReadWrite,
    Read,
}

impl BoardAccess {
    pub fn can_write(&self) -> bool {
        matches!(self, BoardAccess::Owner | BoardAccess::ReadWrite)
    }

    /// Storage form for membership rows. Owners are never stored as members.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardAccess::Owner => "owner",
            BoardAccess::ReadWrite => "read_write",
            BoardAccess::Read => "read",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "owner" => BoardAccess::Owner,
            "read_write" => BoardAccess::ReadWrite,
            _ => BoardAccess::Read,
        }
    }
}

/// A user-owned board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u32,
    pub owner_id: u32,
    pub name: String,
    pub template: BoardTemplate,
    /// Color (hex, e.g., "#FF5733")
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_visible: bool,
    pub display_order: i32,
    pub created_at: i64,
}

impl Board {
    pub fn new(id: u32, owner_id: u32, name: String, template: BoardTemplate) -> Self {
        Self {
            id,
            owner_id,
            name,
            template,
            color: None,
            icon: None,
            is_visible: true,
            display_order: 0,
            created_at: 0,
        }
    }
}

impl Entity for Board {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
