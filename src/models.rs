//! Client Models
//!
//! Entities shared with the backend plus the patch type used for optimistic edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use npc_finder_backend::domain::{
    now_millis, sort_for_display, Board, BoardAccess, BoardTemplate, ItemData, Priority, Section, Task,
    TaskStatus,
};

/// How a moved task takes its place in the destination column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Before the tasks at or after the requested order
    #[default]
    MakeRoom,
    /// After every other task in the column
    Append,
}

/// A partial edit to a cached task. `None` leaves the field as it is; for
/// nullable fields the inner `Option` is the new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub section_id: Option<Option<u32>>,
    pub display_order: Option<i32>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
    pub item_data: Option<ItemData>,
    pub placement: Placement,
}

impl TaskPatch {
    /// Section + order change produced by a drop
    pub fn moved(section_id: Option<u32>, display_order: i32) -> Self {
        Self {
            section_id: Some(section_id),
            display_order: Some(display_order),
            ..Self::default()
        }
    }

    /// Section change that puts the task last in its new column
    pub fn appended(section_id: Option<u32>, display_order: i32) -> Self {
        Self {
            placement: Placement::Append,
            ..Self::moved(section_id, display_order)
        }
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the patch changes column placement
    pub fn is_move(&self) -> bool {
        self.section_id.is_some() || self.display_order.is_some()
    }

    /// Merge into `task`. Status goes through `Task::set_status` so
    /// `completed_at` stays consistent with it.
    pub fn apply_to(&self, task: &mut Task, now: i64) {
        if let Some(section_id) = self.section_id {
            task.section_id = section_id;
        }
        if let Some(order) = self.display_order {
            task.display_order = order;
        }
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(item_data) = &self.item_data {
            task.item_data = item_data.clone();
        }
        if let Some(status) = self.status {
            task.set_status(status, now);
        }
        task.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_patch_touches_only_placement() {
        let mut task = Task::in_section(1, 1, "A".into(), 1, Some(10), 0);
        task.title = "keep".into();
        TaskPatch::moved(Some(11), 4).apply_to(&mut task, 50);
        assert_eq!(task.section_id, Some(11));
        assert_eq!(task.display_order, 4);
        assert_eq!(task.title, "keep");
        assert_eq!(task.updated_at, 50);
    }

    #[test]
    fn test_patch_can_clear_nullable_fields() {
        let mut task = Task::in_section(1, 1, "A".into(), 1, Some(10), 0);
        task.description = Some("old".into());
        let patch = TaskPatch {
            section_id: Some(None),
            description: Some(None),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut task, 1);
        assert_eq!(task.section_id, None);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_status_patch_keeps_completed_at_rule() {
        let mut task = Task::new(1, 1, "A".into());
        TaskPatch::status(TaskStatus::Done).apply_to(&mut task, 9);
        assert_eq!(task.completed_at, Some(9));
        TaskPatch::status(TaskStatus::Todo).apply_to(&mut task, 10);
        assert_eq!(task.completed_at, None);
        assert!(!TaskPatch::status(TaskStatus::Todo).is_move());
        assert_eq!(TaskPatch::appended(None, 2).placement, Placement::Append);
        assert_eq!(TaskPatch::moved(None, 2).placement, Placement::MakeRoom);
    }
}
