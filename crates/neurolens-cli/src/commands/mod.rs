pub mod achievements;
pub mod config;
pub mod export;
pub mod history;
pub mod monitor;
pub mod stats;

use neurolens_core::storage::{Config, Database, PersistedState, SessionStore};

/// Persisted state as the monitor would restore it.
pub(crate) fn load_state() -> Result<PersistedState, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok(db.load_state(config.history_limit))
}
