mod achievements;
mod record;
mod tracker;

pub use achievements::{evaluate, Achievement, AchievementBook, AchievementId, PERFECT_FOCUS_THRESHOLD};
pub use record::{focus_score, SessionRecord, MAX_EYE_STRAIN, MAX_FOCUS_SCORE};
pub use tracker::{SessionOutcome, SessionPhase, SessionTracker, DEFAULT_HISTORY_LIMIT};
