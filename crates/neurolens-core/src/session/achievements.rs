//! Achievement catalog and the unlocked set.
//!
//! The catalog is fixed. `WeekStreak` and `BlinkMaster` are listed in the
//! gallery but no rule awards them yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::SessionRecord;

/// Focus score at or above which a session earns `PerfectFocus`.
pub const PERFECT_FOCUS_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstSession,
    TenSessions,
    PerfectFocus,
    WeekStreak,
    BlinkMaster,
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::FirstSession,
        AchievementId::TenSessions,
        AchievementId::PerfectFocus,
        AchievementId::WeekStreak,
        AchievementId::BlinkMaster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstSession => "first_session",
            Self::TenSessions => "ten_sessions",
            Self::PerfectFocus => "perfect_focus",
            Self::WeekStreak => "week_streak",
            Self::BlinkMaster => "blink_master",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstSession => "First Steps",
            Self::TenSessions => "Dedicated Protector",
            Self::PerfectFocus => "Eagle Eye",
            Self::WeekStreak => "Weekly Warrior",
            Self::BlinkMaster => "Blink Master",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstSession => "Completed your first monitoring session",
            Self::TenSessions => "Completed 10 monitoring sessions",
            Self::PerfectFocus => "Achieved 90+ focus score",
            Self::WeekStreak => "Maintain a 7-day streak",
            Self::BlinkMaster => "Maintain healthy blink rate for 5 sessions",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::FirstSession => "👁️",
            Self::TenSessions => "🏆",
            Self::PerfectFocus => "🦅",
            Self::WeekStreak => "🔥",
            Self::BlinkMaster => "✨",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Catalog entry in its locked state.
    pub fn locked(id: AchievementId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            description: id.description().to_string(),
            icon: id.icon().to_string(),
            unlocked_at: None,
        }
    }

    pub fn unlocked(id: AchievementId, at: DateTime<Utc>) -> Self {
        Self {
            unlocked_at: Some(at),
            ..Self::locked(id)
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// Achievements earned by the session that just ended.
///
/// `total_sessions` is the count including that session. Only the exact
/// milestone totals qualify, matching a once-per-milestone award.
pub fn evaluate(total_sessions: u64, session: &SessionRecord) -> Vec<AchievementId> {
    let mut earned = Vec::new();
    if total_sessions == 1 {
        earned.push(AchievementId::FirstSession);
    }
    if total_sessions == 10 {
        earned.push(AchievementId::TenSessions);
    }
    if session.focus_score >= PERFECT_FOCUS_THRESHOLD {
        earned.push(AchievementId::PerfectFocus);
    }
    earned
}

/// The set of unlocked achievements, in unlock order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    unlocked: Vec<Achievement>,
}

impl AchievementBook {
    /// Build from previously persisted entries, dropping duplicates and
    /// entries without an unlock time.
    pub fn from_unlocked(entries: impl IntoIterator<Item = Achievement>) -> Self {
        let mut book = Self::default();
        for entry in entries {
            if let Some(at) = entry.unlocked_at {
                book.unlock(entry.id, at);
            }
        }
        book
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.iter().any(|a| a.id == id)
    }

    pub fn get(&self, id: AchievementId) -> Option<&Achievement> {
        self.unlocked.iter().find(|a| a.id == id)
    }

    /// Insert if absent. Returns the new entry only when it was not
    /// already unlocked.
    pub fn unlock(&mut self, id: AchievementId, at: DateTime<Utc>) -> Option<Achievement> {
        if self.is_unlocked(id) {
            return None;
        }
        let achievement = Achievement::unlocked(id, at);
        self.unlocked.push(achievement.clone());
        Some(achievement)
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// The whole catalog, with unlock times filled in where earned.
    pub fn gallery(&self) -> Vec<Achievement> {
        AchievementId::ALL
            .iter()
            .map(|&id| {
                self.get(id)
                    .cloned()
                    .unwrap_or_else(|| Achievement::locked(id))
            })
            .collect()
    }
}
