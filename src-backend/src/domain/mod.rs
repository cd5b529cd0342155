//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod board;
mod section;
mod task;
mod item_data;

pub use entity::{now_millis, DomainError, DomainResult, Entity};
pub use board::{Board, BoardAccess, BoardTemplate};
pub use section::{Section, SectionDeletion};
pub use task::{sort_for_display, Priority, RepeatRule, RepeatUnit, Task, TaskStatus, TimerInfo};
pub use item_data::{ItemData, JobStatusChange};
