//! Fatigue watchdog.
//!
//! Stateless: each check looks only at the current blink rate, so a
//! sustained low rate raises an alert on every check.

use serde::{Deserialize, Serialize};

use crate::notify::{Notification, NotificationKind, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueVerdict {
    /// Rate below the fatigue threshold.
    Fatigued,
    /// Rate in `[fatigue_threshold, drowsy_threshold)`.
    Drowsy,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatigueWatchdog {
    fatigue_threshold: u32,
    drowsy_threshold: u32,
}

impl Default for FatigueWatchdog {
    fn default() -> Self {
        Self::new(8, 10)
    }
}

impl FatigueWatchdog {
    pub fn new(fatigue_threshold: u32, drowsy_threshold: u32) -> Self {
        Self {
            fatigue_threshold,
            drowsy_threshold: drowsy_threshold.max(fatigue_threshold),
        }
    }

    pub fn check(&self, blink_rate: u32) -> FatigueVerdict {
        if blink_rate < self.fatigue_threshold {
            FatigueVerdict::Fatigued
        } else if blink_rate < self.drowsy_threshold {
            FatigueVerdict::Drowsy
        } else {
            FatigueVerdict::Alert
        }
    }

    /// The message for a verdict, if it warrants one.
    pub fn notification(verdict: FatigueVerdict) -> Option<Notification> {
        match verdict {
            FatigueVerdict::Fatigued => Some(Notification::new(
                NotificationKind::Fatigue,
                Severity::Critical,
                "⚠️ Fatigue Detected",
                "Your blink rate is very low. Consider taking a break to rest your eyes.",
            )),
            FatigueVerdict::Drowsy => Some(Notification::new(
                NotificationKind::Drowsiness,
                Severity::Warning,
                "😴 Low Blink Rate",
                "You might be getting tired. Consider taking a short break.",
            )),
            FatigueVerdict::Alert => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let w = FatigueWatchdog::default();
        assert_eq!(w.check(0), FatigueVerdict::Fatigued);
        assert_eq!(w.check(7), FatigueVerdict::Fatigued);
        assert_eq!(w.check(8), FatigueVerdict::Drowsy);
        assert_eq!(w.check(9), FatigueVerdict::Drowsy);
        assert_eq!(w.check(10), FatigueVerdict::Alert);
    }

    #[test]
    fn repeated_checks_repeat_the_verdict() {
        let w = FatigueWatchdog::default();
        assert!((0..5).all(|_| w.check(5) == FatigueVerdict::Fatigued));
    }

    #[test]
    fn severities() {
        let critical = FatigueWatchdog::notification(FatigueVerdict::Fatigued).unwrap();
        assert_eq!(critical.severity, Severity::Critical);
        let advisory = FatigueWatchdog::notification(FatigueVerdict::Drowsy).unwrap();
        assert_eq!(advisory.severity, Severity::Warning);
        assert!(FatigueWatchdog::notification(FatigueVerdict::Alert).is_none());
    }

    #[test]
    fn inverted_thresholds_have_no_drowsy_band() {
        let w = FatigueWatchdog::new(8, 4);
        assert_eq!(w.check(7), FatigueVerdict::Fatigued);
        assert_eq!(w.check(8), FatigueVerdict::Alert);
    }
}
