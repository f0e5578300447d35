//! Session lifecycle state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --begin--> Active --finish--> Idle
//!                  |  ^
//!                  +--+ tick / blink / fatigue / gaze-away / strain
//! ```
//!
//! The tracker is the only writer of session records. It performs no I/O;
//! the caller persists the [`SessionOutcome`] returned by `finish`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::achievements::{evaluate, Achievement, AchievementBook};
use super::record::SessionRecord;
use crate::storage::PersistedState;

/// Default number of archived sessions kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
}

/// Everything produced by archiving a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session: SessionRecord,
    pub total_sessions: u64,
    /// Achievements unlocked by this session, not previously held.
    pub unlocked: Vec<Achievement>,
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    current: Option<SessionRecord>,
    /// Newest first.
    history: Vec<SessionRecord>,
    history_limit: usize,
    total_sessions: u64,
    streak: u64,
    achievements: AchievementBook,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::restore(PersistedState::default(), DEFAULT_HISTORY_LIMIT)
    }
}

impl SessionTracker {
    /// Rebuild the tracker from persisted state. History beyond the limit
    /// is dropped, oldest first.
    pub fn restore(state: PersistedState, history_limit: usize) -> Self {
        let history_limit = history_limit.max(1);
        let mut history = state.history;
        history.truncate(history_limit);
        Self {
            current: None,
            history,
            history_limit,
            total_sessions: state.total_sessions,
            streak: state.streak,
            achievements: AchievementBook::from_unlocked(state.achievements),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        if self.current.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Idle
        }
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn total_sessions(&self) -> u64 {
        self.total_sessions
    }

    pub fn streak(&self) -> u64 {
        self.streak
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Active. Returns the new session, or `None` if one is
    /// already running.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Option<&SessionRecord> {
        if self.current.is_some() {
            return None;
        }
        let session = SessionRecord::new(now);
        tracing::info!(session_id = %session.id, "session started");
        self.current = Some(session);
        self.current.as_ref()
    }

    /// Once-per-second update. Returns the updated session.
    pub fn tick(&mut self, blink_rate: u32) -> Option<&SessionRecord> {
        let session = self.current.as_mut()?;
        session.tick(blink_rate);
        Some(&*session)
    }

    /// Returns the new blink count.
    pub fn record_blink(&mut self) -> Option<u64> {
        let session = self.current.as_mut()?;
        session.blink_count += 1;
        Some(session.blink_count)
    }

    /// Returns the new fatigue-detection count.
    pub fn record_fatigue(&mut self) -> Option<u64> {
        let session = self.current.as_mut()?;
        session.add_fatigue();
        Some(session.fatigue_detections)
    }

    /// Returns the new gaze-away count.
    pub fn record_gaze_away(&mut self) -> Option<u64> {
        let session = self.current.as_mut()?;
        session.gaze_away_count += 1;
        Some(session.gaze_away_count)
    }

    /// Overwrite the strain level (clamped to 0..=10). Returns the stored level.
    pub fn update_eye_strain(&mut self, level: u8) -> Option<u8> {
        let session = self.current.as_mut()?;
        session.set_eye_strain(level);
        Some(session.eye_strain_level)
    }

    /// Active -> Idle. Archives the session, bumps the total and evaluates
    /// achievements. Returns `None` when idle.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<SessionOutcome> {
        let mut session = self.current.take()?;
        session.finish(now);

        self.history.insert(0, session.clone());
        self.history.truncate(self.history_limit);
        self.total_sessions += 1;

        let unlocked: Vec<Achievement> = evaluate(self.total_sessions, &session)
            .into_iter()
            .filter_map(|id| self.achievements.unlock(id, now))
            .collect();

        tracing::info!(
            session_id = %session.id,
            duration_secs = session.duration_secs,
            focus_score = session.focus_score,
            total_sessions = self.total_sessions,
            unlocked = unlocked.len(),
            "session archived"
        );

        Some(SessionOutcome {
            session,
            total_sessions: self.total_sessions,
            unlocked,
        })
    }
}
