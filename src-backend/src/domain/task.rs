//! Task Entity
//!
//! The core work item. Boarded tasks sit in at most one section of their board;
//! tasks without a board live in the inbox.

use std::cmp::Ordering;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::item_data::ItemData;

/// Lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    /// Soft-deleted
    Archived,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "in_progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            "archived" => TaskStatus::Archived,
            _ => TaskStatus::Todo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatUnit {
    Day,
    Week,
    Month,
}

/// Repeat schedule. Completing a repeating task reschedules it instead of closing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRule {
    pub every: u32,
    pub unit: RepeatUnit,
}

impl RepeatRule {
    pub fn next_due(&self, from: NaiveDate) -> Option<NaiveDate> {
        let every = self.every.max(1);
        match self.unit {
            RepeatUnit::Day => from.checked_add_days(Days::new(u64::from(every))),
            RepeatUnit::Week => from.checked_add_days(Days::new(u64::from(every) * 7)),
            RepeatUnit::Month => from.checked_add_months(Months::new(every)),
        }
    }
}

/// Time tracking metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TimerInfo {
    /// Epoch milliseconds the running timer was started, if running
    pub started_at: Option<i64>,
    pub accumulated_secs: i64,
}

impl TimerInfo {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub owner_id: u32,
    /// None = inbox
    pub board_id: Option<u32>,
    pub section_id: Option<u32>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub item_data: ItemData,
    /// Render position within its (board, section) column
    pub display_order: i32,
    pub repeat: Option<RepeatRule>,
    pub timer: Option<TimerInfo>,
    /// Epoch milliseconds
    pub reminder_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
    pub last_completed_at: Option<i64>,
}

impl Task {
    /// Create a new inbox task with default values
    pub fn new(id: u32, owner_id: u32, title: String) -> Self {
        Self {
            id,
            owner_id,
            board_id: None,
            section_id: None,
            title,
            description: None,
            status: TaskStatus::Todo,
            priority: None,
            due_date: None,
            tags: Vec::new(),
            item_data: ItemData::default(),
            display_order: 0,
            repeat: None,
            timer: None,
            reminder_at: None,
            created_at: 0,
            updated_at: 0,
            completed_at: None,
            last_completed_at: None,
        }
    }

    /// Create a new task in a board column
    pub fn in_section(
        id: u32,
        owner_id: u32,
        title: String,
        board_id: u32,
        section_id: Option<u32>,
        display_order: i32,
    ) -> Self {
        Self {
            board_id: Some(board_id),
            section_id,
            display_order,
            ..Self::new(id, owner_id, title)
        }
    }

    pub fn is_inbox(&self) -> bool {
        self.board_id.is_none()
    }

    /// Change status, keeping `completed_at` in step: set on entering `done`,
    /// cleared on leaving it.
    pub fn set_status(&mut self, status: TaskStatus, now: i64) {
        if status == TaskStatus::Done {
            if self.status != TaskStatus::Done || self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Mark the task complete. A repeating task is rescheduled to its next due
    /// date and stays open; returns whether that happened.
    pub fn complete(&mut self, now: i64, today: NaiveDate) -> bool {
        match self.repeat {
            Some(rule) => {
                let base = self.due_date.unwrap_or(today);
                self.due_date = rule.next_due(base).or(Some(base));
                self.last_completed_at = Some(now);
                self.set_status(TaskStatus::Todo, now);
                true
            }
            None => {
                self.set_status(TaskStatus::Done, now);
                false
            }
        }
    }

    /// Start the timer; no-op if it is already running
    pub fn start_timer(&mut self, now: i64) {
        let timer = self.timer.get_or_insert_with(TimerInfo::default);
        if timer.started_at.is_none() {
            timer.started_at = Some(now);
            self.updated_at = now;
        }
    }

    /// Stop the timer and fold the elapsed time into the accumulated total
    pub fn stop_timer(&mut self, now: i64) {
        if let Some(timer) = self.timer.as_mut() {
            if let Some(started) = timer.started_at.take() {
                timer.accumulated_secs += (now - started).max(0) / 1000;
                self.updated_at = now;
            }
        }
    }

    /// Column render order: display_order, then created_at, then id
    pub fn display_cmp(&self, other: &Task) -> Ordering {
        self.display_order
            .cmp(&other.display_order)
            .then(self.created_at.cmp(&other.created_at))
            .then(self.id.cmp(&other.id))
    }
}

/// Sort tasks into render order
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.display_cmp(b));
}

impl Entity for Task {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
