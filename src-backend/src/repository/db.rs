//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared handle to the database connection
#[derive(Clone)]
pub struct DbState {
    pub conn: Arc<Mutex<Connection>>,
}

impl DbState {
    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

/// Open (or create) the database at `db_path` and run migrations
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Internal(format!("Failed to create db dir: {}", e)))?;
        }
    }
    let conn = Connection::open(db_path)?;
    run_migrations(&conn)?;
    tracing::info!(path = %db_path.display(), "database ready");
    Ok(DbState::from_connection(conn))
}

/// In-memory database, used by tests and throwaway sessions
pub fn init_in_memory() -> DomainResult<DbState> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(DbState::from_connection(conn))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            template TEXT NOT NULL DEFAULT 'kanban',
            color TEXT,
            icon TEXT,
            is_visible INTEGER NOT NULL DEFAULT 1,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS board_members (
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL,
            access TEXT NOT NULL,
            PRIMARY KEY (board_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            board_id INTEGER REFERENCES boards(id) ON DELETE CASCADE,
            section_id INTEGER REFERENCES sections(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'todo',
            priority TEXT,
            due_date TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            item_data TEXT NOT NULL DEFAULT '{\"template\":\"kanban\"}',
            display_order INTEGER NOT NULL DEFAULT 0,
            repeat_rule TEXT,
            timer TEXT,
            reminder_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            completed_at INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks(board_id, section_id);
        CREATE INDEX IF NOT EXISTS idx_sections_board ON sections(board_id);",
    )?;

    // Repeat completion bookkeeping came after the first schema
    if !column_exists(conn, "tasks", "last_completed_at")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN last_completed_at INTEGER", [])?;
    }

    Ok(())
}
