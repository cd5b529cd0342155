//! Template Payloads
//!
//! The structured part of a task whose shape depends on its board's template.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::board::BoardTemplate;

/// One entry in a job application's status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusChange {
    pub status: String,
    /// Epoch milliseconds
    pub at: i64,
}

/// Per-template task payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum ItemData {
    Kanban {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    JobTracker {
        company: String,
        position: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        status: String,
        #[serde(default)]
        status_history: Vec<JobStatusChange>,
    },
    Recipe {
        #[serde(default)]
        ingredients: Vec<String>,
        #[serde(default)]
        instructions: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        servings: Option<u32>,
    },
    Grocery {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default = "default_quantity")]
        quantity: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Markdown {
        #[serde(default)]
        body: String,
    },
    Custom {
        #[serde(default)]
        fields: BTreeMap<String, serde_json::Value>,
    },
}

fn default_quantity() -> u32 {
    1
}

impl Default for ItemData {
    fn default() -> Self {
        ItemData::Kanban { notes: None }
    }
}

impl ItemData {
    /// Empty payload for a freshly created task on a board of this template
    pub fn empty_for(template: BoardTemplate) -> Self {
        match template {
            BoardTemplate::Kanban => ItemData::Kanban { notes: None },
            BoardTemplate::JobTracker => ItemData::JobTracker {
                company: String::new(),
                position: String::new(),
                url: None,
                status: "applied".to_string(),
                status_history: Vec::new(),
            },
            BoardTemplate::Recipe => ItemData::Recipe {
                ingredients: Vec::new(),
                instructions: Vec::new(),
                servings: None,
            },
            BoardTemplate::Grocery => ItemData::Grocery {
                category: None,
                quantity: default_quantity(),
                unit: None,
            },
            BoardTemplate::Markdown => ItemData::Markdown { body: String::new() },
            BoardTemplate::Custom => ItemData::Custom { fields: BTreeMap::new() },
        }
    }

    pub fn template(&self) -> BoardTemplate {
        match self {
            ItemData::Kanban { .. } => BoardTemplate::Kanban,
            ItemData::JobTracker { .. } => BoardTemplate::JobTracker,
            ItemData::Recipe { .. } => BoardTemplate::Recipe,
            ItemData::Grocery { .. } => BoardTemplate::Grocery,
            ItemData::Markdown { .. } => BoardTemplate::Markdown,
            ItemData::Custom { .. } => BoardTemplate::Custom,
        }
    }

    /// Whether this payload may live on a board of `template`.
    /// Generic kanban payloads are accepted on custom boards too.
    pub fn fits(&self, template: BoardTemplate) -> bool {
        let own = self.template();
        own == template || (own == BoardTemplate::Kanban && template == BoardTemplate::Custom)
    }

    /// Record a job application status change, keeping the history
    pub fn push_job_status(&mut self, new_status: &str, at: i64) -> bool {
        match self {
            ItemData::JobTracker { status, status_history, .. } => {
                status_history.push(JobStatusChange {
                    status: std::mem::replace(status, new_status.to_string()),
                    at,
                });
                true
            }
            _ => false,
        }
    }
}
