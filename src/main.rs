//! NPC Finder Entry Point
//!
//! Loads settings, starts logging and storage, and logs the boards visible
//! to the user given as the first argument (default 1).

use npc_finder::{App, AppError};
use npc_finder_backend::commands;
use npc_finder_backend::config::Settings;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    let app = App::bootstrap(settings).await?;

    let user_id = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or(1);

    for board in commands::list_boards(&app.state, user_id).await? {
        let tasks = commands::list_tasks(&app.state, user_id, board.id).await?;
        tracing::info!(
            board_id = board.id,
            name = %board.name,
            template = board.template.as_str(),
            tasks = tasks.len(),
            "board"
        );
    }
    Ok(())
}
