//! Wall-clock periodic timers.
//!
//! Timers never sleep or spawn. They only remember when they are next due;
//! the owner polls them with the current time and fires whatever is due.
//! This keeps every component deterministic under test and lets a single
//! task drive all of them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A repeating timer with a fixed period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicTimer {
    period_ms: i64,
    /// Next due instant. `None` means the timer is cleared.
    #[serde(default)]
    next_due: Option<DateTime<Utc>>,
}

impl PeriodicTimer {
    /// Create a cleared timer. Periods shorter than a millisecond are
    /// clamped up so polling always makes progress.
    pub fn new(period: Duration) -> Self {
        Self {
            period_ms: period.num_milliseconds().max(1),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::milliseconds(self.period_ms)
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Arm the timer so it first fires one period after `now`.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(now + self.period());
    }

    /// Clear the timer. A cleared timer never fires until re-armed.
    pub fn clear(&mut self) {
        self.next_due = None;
    }

    /// Fire the timer if it is due at or before `now`.
    ///
    /// Returns the scheduled instant of the firing (not `now`), and moves
    /// the due time one period forward. Call repeatedly to catch up.
    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let due = self.next_due?;
        if due > now {
            return None;
        }
        self.next_due = Some(due + self.period());
        Some(due)
    }
}

/// Rate limiter admitting at most one observation per window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Throttle {
    window_ms: i64,
    #[serde(default)]
    last_admitted: Option<DateTime<Utc>>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.num_milliseconds().max(0),
            last_admitted: None,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::milliseconds(self.window_ms)
    }

    pub fn last_admitted(&self) -> Option<DateTime<Utc>> {
        self.last_admitted
    }

    /// Admit `now` if a full window has passed since the last admission.
    pub fn try_admit(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_admitted {
            if now - last < self.window() {
                return false;
            }
        }
        self.last_admitted = Some(now);
        true
    }
}
