//! Reminder content and the low-blink-rate gate.
//!
//! The periodic break and tip timers live in the monitor's
//! [`TimerSet`](crate::timer::TimerSet); this module decides what each
//! firing says. The low-blink-rate check is driven by rate observations
//! and admits at most one check per window.

mod tips;

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use crate::notify::{Notification, NotificationKind, Severity};
use crate::timer::Throttle;

pub use tips::HEALTH_TIPS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub low_blink_window: Duration,
    pub low_blink_threshold: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            low_blink_window: Duration::seconds(30),
            low_blink_threshold: 12,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    low_blink: Throttle,
    low_blink_threshold: u32,
    rng: Mcg128Xsl64,
}

impl ReminderScheduler {
    pub fn new(settings: &ReminderSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Mcg128Xsl64::seed_from_u64(s),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            low_blink: Throttle::new(settings.low_blink_window),
            low_blink_threshold: settings.low_blink_threshold,
            rng,
        }
    }

    /// The 20-20-20 break reminder.
    pub fn break_reminder(&self) -> Notification {
        Notification::new(
            NotificationKind::BreakReminder,
            Severity::Info,
            "⏰ Time for a 20-20-20 Break!",
            "Look at something 20 feet away for 20 seconds to reduce eye strain and relax your eye muscles.",
        )
    }

    /// Feed a blink-rate observation. At most one observation per window is
    /// checked; a checked rate below the threshold yields a reminder.
    pub fn observe_blink_rate(&mut self, now: DateTime<Utc>, rate: u32) -> Option<Notification> {
        if !self.low_blink.try_admit(now) {
            return None;
        }
        if rate >= self.low_blink_threshold {
            return None;
        }
        tracing::debug!(rate, "low blink rate reminder");
        Some(Notification::new(
            NotificationKind::LowBlinkRate,
            Severity::Warning,
            "👁️ Low Blink Rate Detected!",
            format!(
                "Your blink rate is {rate}/min. Remember to blink more frequently to prevent dry eyes and maintain eye moisture."
            ),
        ))
    }

    /// A tip drawn uniformly from [`HEALTH_TIPS`].
    pub fn health_tip(&mut self) -> Notification {
        let tip = HEALTH_TIPS[self.rng.gen_range(0..HEALTH_TIPS.len())];
        Notification::new(NotificationKind::HealthTip, Severity::Info, "💡 Eye Health Tip", tip)
    }
}
