//! Commands Layer
//!
//! User-facing operations that bridge callers to the repositories.

mod board_cmd;
mod task_cmd;


pub use board_cmd::*;
pub use task_cmd::*;
