mod config;
pub mod database;
pub mod migrations;
pub mod store;

pub use config::{Config, FatigueConfig, RemindersConfig, SimulationConfig};
pub use database::Database;
pub use store::{
    MemoryStore, PersistedState, SessionStore, ACHIEVEMENTS_KEY, HISTORY_KEY, STREAK_KEY,
    TOTAL_SESSIONS_KEY,
};

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Returns `~/.config/neurolens[-dev]/` based on NEUROLENS_ENV.
///
/// Set NEUROLENS_ENV=dev to use development data directory.
/// NEUROLENS_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("NEUROLENS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("NEUROLENS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("neurolens-dev")
            } else {
                base_dir.join("neurolens")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(CoreError::Io)?;
    Ok(dir)
}
