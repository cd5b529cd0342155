//! Settings
//!
//! Layered configuration: built-in defaults, then an optional `npc-finder.toml`
//! next to the working directory, then `NPC_FINDER__*` environment variables
//! (e.g. `NPC_FINDER__DRAG__GRACE_MS=150`). A `.env` file is honoured.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    pub app_name: String,
    /// Rotate the active log file once it grows past this many bytes
    pub max_bytes: u64,
    /// Number of rotated files kept besides the active one
    pub max_files: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DragSettings {
    /// How long a drag-end keeps the dragged task around for a late drop
    pub grace_ms: u64,
}

impl DragSettings {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub drag: DragSettings,
}

impl Settings {
    /// Load from defaults, `npc-finder.toml` and the environment
    pub fn load() -> Result<Self, SettingsError> {
        let _ = dotenvy::dotenv();
        let config = Self::builder()?
            .add_source(File::with_name("npc-finder").required(false))
            .add_source(Environment::with_prefix("NPC_FINDER").separator("__"))
            .build()?;
        Self::from_config(config)
    }

    /// Defaults only
    pub fn defaults() -> Result<Self, SettingsError> {
        Self::from_config(Self::builder()?.build()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("database.path", "npc-finder.db")?
            .set_default("logging.dir", "logs")?
            .set_default("logging.app_name", "NpcFinder")?
            .set_default("logging.max_bytes", 1_048_576_i64)?
            .set_default("logging.max_files", 3_i64)?
            .set_default("drag.grace_ms", 100_i64)?)
    }

    fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        if settings.logging.max_bytes == 0 {
            return Err(SettingsError::Invalid {
                key: "logging.max_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if settings.logging.app_name.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "logging.app_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(settings)
    }
}
