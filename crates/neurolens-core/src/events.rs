use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notify::{Delivery, Notification};
use crate::session::{Achievement, SessionRecord};

/// Every state change in the monitor produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MonitoringStarted {
        at: DateTime<Utc>,
    },
    MonitoringStopped {
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// Once per second while a session is active.
    SessionTicked {
        session_id: String,
        duration_secs: u64,
        avg_blink_rate: u32,
        focus_score: u8,
        at: DateTime<Utc>,
    },
    BlinkDetected {
        blink_count: u64,
        at: DateTime<Utc>,
    },
    BlinkRateSampled {
        blink_rate: u32,
        at: DateTime<Utc>,
    },
    EyeStrainUpdated {
        eye_strain_level: u8,
        focus_score: u8,
        at: DateTime<Utc>,
    },
    GazeAwayRecorded {
        gaze_away_count: u64,
        at: DateTime<Utc>,
    },
    FatigueDetected {
        blink_rate: u32,
        fatigue_detections: u64,
        focus_score: u8,
        at: DateTime<Utc>,
    },
    /// Blink rate in the drowsy band; advisory only.
    DrowsinessAdvisory {
        blink_rate: u32,
        at: DateTime<Utc>,
    },
    NotificationRaised {
        notification: Notification,
        delivery: Delivery,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session: SessionRecord,
        total_sessions: u64,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement: Achievement,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        monitoring: bool,
        blink_rate: u32,
        session: Option<SessionRecord>,
        total_sessions: u64,
        streak: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Wire name of the variant, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MonitoringStarted { .. } => "MonitoringStarted",
            Self::MonitoringStopped { .. } => "MonitoringStopped",
            Self::SessionStarted { .. } => "SessionStarted",
            Self::SessionTicked { .. } => "SessionTicked",
            Self::BlinkDetected { .. } => "BlinkDetected",
            Self::BlinkRateSampled { .. } => "BlinkRateSampled",
            Self::EyeStrainUpdated { .. } => "EyeStrainUpdated",
            Self::GazeAwayRecorded { .. } => "GazeAwayRecorded",
            Self::FatigueDetected { .. } => "FatigueDetected",
            Self::DrowsinessAdvisory { .. } => "DrowsinessAdvisory",
            Self::NotificationRaised { .. } => "NotificationRaised",
            Self::SessionEnded { .. } => "SessionEnded",
            Self::AchievementUnlocked { .. } => "AchievementUnlocked",
            Self::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
