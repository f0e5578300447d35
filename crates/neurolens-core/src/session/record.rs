use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest eye strain level a session can carry.
pub const MAX_EYE_STRAIN: u8 = 10;

/// Focus score of a fresh session.
pub const MAX_FOCUS_SCORE: u8 = 100;

/// One monitoring session.
///
/// Active while `end_time` is `None`. The focus score is derived from the
/// strain level and fatigue count and is refreshed on every mutation made
/// through [`SessionRecord`]'s methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed seconds.
    pub duration_secs: u64,
    pub blink_count: u64,
    /// Blinks per minute, as last sampled.
    pub avg_blink_rate: u32,
    pub focus_score: u8,
    pub eye_strain_level: u8,
    pub gaze_away_count: u64,
    pub fatigue_detections: u64,
}

impl SessionRecord {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: format!("session_{}", Uuid::new_v4().simple()),
            start_time,
            end_time: None,
            duration_secs: 0,
            blink_count: 0,
            avg_blink_rate: 0,
            focus_score: MAX_FOCUS_SCORE,
            eye_strain_level: 0,
            gaze_away_count: 0,
            fatigue_detections: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Duration in fractional minutes.
    pub fn duration_minutes(&self) -> f64 {
        self.duration_secs as f64 / 60.0
    }

    pub(crate) fn tick(&mut self, blink_rate: u32) {
        self.duration_secs += 1;
        self.avg_blink_rate = blink_rate;
        self.refresh_focus();
    }

    pub(crate) fn set_eye_strain(&mut self, level: u8) {
        self.eye_strain_level = level.min(MAX_EYE_STRAIN);
        self.refresh_focus();
    }

    pub(crate) fn add_fatigue(&mut self) {
        self.fatigue_detections += 1;
        self.refresh_focus();
    }

    pub(crate) fn finish(&mut self, at: DateTime<Utc>) {
        self.refresh_focus();
        self.end_time = Some(at);
    }

    fn refresh_focus(&mut self) {
        self.focus_score = focus_score(self.eye_strain_level, self.fatigue_detections);
    }
}

/// `max(0, 100 - 10 * strain - 5 * fatigue)`.
pub fn focus_score(eye_strain_level: u8, fatigue_detections: u64) -> u8 {
    let penalty = 10 * u64::from(eye_strain_level) + fatigue_detections.saturating_mul(5);
    u64::from(MAX_FOCUS_SCORE).saturating_sub(penalty) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_zeroed() {
        let s = SessionRecord::new(Utc::now());
        assert!(s.is_active());
        assert!(s.id.starts_with("session_"));
        assert_eq!(s.duration_secs, 0);
        assert_eq!(s.focus_score, 100);
        assert_eq!(s.blink_count + s.gaze_away_count + s.fatigue_detections, 0);
    }

    #[test]
    fn ids_are_unique() {
        let now = Utc::now();
        assert_ne!(SessionRecord::new(now).id, SessionRecord::new(now).id);
    }

    #[test]
    fn focus_score_formula() {
        assert_eq!(focus_score(0, 0), 100);
        assert_eq!(focus_score(2, 1), 75);
        assert_eq!(focus_score(10, 0), 0);
        assert_eq!(focus_score(5, 20), 0);
        assert_eq!(focus_score(0, u64::MAX), 0);
    }

    #[test]
    fn strain_is_clamped_and_focus_follows() {
        let mut s = SessionRecord::new(Utc::now());
        s.set_eye_strain(14);
        assert_eq!(s.eye_strain_level, 10);
        assert_eq!(s.focus_score, 0);
        s.set_eye_strain(1);
        s.add_fatigue();
        assert_eq!(s.focus_score, 85);
    }

    #[test]
    fn duration_minutes() {
        let mut s = SessionRecord::new(Utc::now());
        s.duration_secs = 90;
        assert!((s.duration_minutes() - 1.5).abs() < f64::EPSILON);
    }
}
