//! Persisted monitoring state over a key-value backend.
//!
//! Four independent entries are stored, each overwritten as a whole:
//! session history, unlocked achievements, streak and total session count.
//! Reads are tolerant: a missing entry means first run, and an entry that
//! fails to parse is discarded in favour of the empty default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{Achievement, AchievementBook, SessionRecord};

pub const HISTORY_KEY: &str = "session_history";
pub const ACHIEVEMENTS_KEY: &str = "achievements";
pub const STREAK_KEY: &str = "streak";
pub const TOTAL_SESSIONS_KEY: &str = "total_sessions";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Newest first.
    pub history: Vec<SessionRecord>,
    pub achievements: Vec<Achievement>,
    pub streak: u64,
    pub total_sessions: u64,
}

/// Key-value storage for the persisted state.
///
/// Implementors provide raw get/set; loading and saving are shared.
pub trait SessionStore: Send {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()>;

    /// Load everything, falling back to defaults for missing or corrupt
    /// entries. History is truncated to `history_limit` and achievements
    /// are deduplicated.
    fn load_state(&self, history_limit: usize) -> PersistedState {
        let mut history: Vec<SessionRecord> = read_json(self, HISTORY_KEY).unwrap_or_default();
        history.truncate(history_limit);

        // Parse entries one by one so an unknown id does not discard the rest.
        let raw_achievements: Vec<serde_json::Value> =
            read_json(self, ACHIEVEMENTS_KEY).unwrap_or_default();
        let achievements = AchievementBook::from_unlocked(
            raw_achievements
                .into_iter()
                .filter_map(|v| serde_json::from_value::<Achievement>(v).ok()),
        )
        .unlocked()
        .to_vec();

        PersistedState {
            history,
            achievements,
            streak: read_counter(self, STREAK_KEY),
            total_sessions: read_counter(self, TOTAL_SESSIONS_KEY),
        }
    }

    fn save_history(&mut self, history: &[SessionRecord]) -> Result<()> {
        let json = serde_json::to_string(history)?;
        self.set_raw(HISTORY_KEY, &json)
    }

    fn save_achievements(&mut self, achievements: &[Achievement]) -> Result<()> {
        let json = serde_json::to_string(achievements)?;
        self.set_raw(ACHIEVEMENTS_KEY, &json)
    }

    fn save_total_sessions(&mut self, total: u64) -> Result<()> {
        self.set_raw(TOTAL_SESSIONS_KEY, &total.to_string())
    }

    fn save_streak(&mut self, streak: u64) -> Result<()> {
        self.set_raw(STREAK_KEY, &streak.to_string())
    }
}

fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: SessionStore + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    let raw = match store.get_raw(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted entry");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding corrupt persisted entry");
            None
        }
    }
}

fn read_counter<S: SessionStore + ?Sized>(store: &S, key: &str) -> u64 {
    match store.get_raw(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "discarding corrupt counter");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted counter");
            0
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, e.g. to simulate corrupt state.
    pub fn with_raw(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl SessionStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_raw(key, value)
    }
}
