//! The scheduler handle owning every periodic timer of a monitoring run.
//!
//! All timers are armed together when monitoring turns on and cleared
//! together when it turns off, so no component can keep a stale timer
//! alive across sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::periodic::PeriodicTimer;

/// Identifies which component a due timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Session tracker: once per second
    SessionTick,
    /// Metric simulator: blink sampling
    BlinkSample,
    /// Metric simulator: blink-rate and eye-strain sampling
    RateSample,
    /// Reminder scheduler: 20-20-20 break
    BreakReminder,
    /// Reminder scheduler: rotating health tip
    HealthTip,
    /// Fatigue watchdog check
    FatigueCheck,
}

impl TimerKind {
    pub const ALL: [TimerKind; 6] = [
        TimerKind::SessionTick,
        TimerKind::BlinkSample,
        TimerKind::RateSample,
        TimerKind::BreakReminder,
        TimerKind::HealthTip,
        TimerKind::FatigueCheck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionTick => "session_tick",
            Self::BlinkSample => "blink_sample",
            Self::RateSample => "rate_sample",
            Self::BreakReminder => "break_reminder",
            Self::HealthTip => "health_tip",
            Self::FatigueCheck => "fatigue_check",
        }
    }
}

/// Periods for every timer kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerIntervals {
    pub session_tick: Duration,
    pub blink_sample: Duration,
    pub rate_sample: Duration,
    pub break_reminder: Duration,
    pub health_tip: Duration,
    pub fatigue_check: Duration,
}

impl Default for TimerIntervals {
    fn default() -> Self {
        Self {
            session_tick: Duration::seconds(1),
            blink_sample: Duration::seconds(3),
            rate_sample: Duration::seconds(10),
            break_reminder: Duration::minutes(20),
            health_tip: Duration::minutes(30),
            fatigue_check: Duration::seconds(15),
        }
    }
}

impl TimerIntervals {
    pub fn period(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::SessionTick => self.session_tick,
            TimerKind::BlinkSample => self.blink_sample,
            TimerKind::RateSample => self.rate_sample,
            TimerKind::BreakReminder => self.break_reminder,
            TimerKind::HealthTip => self.health_tip,
            TimerKind::FatigueCheck => self.fatigue_check,
        }
    }
}

/// Owns one [`PeriodicTimer`] per [`TimerKind`].
#[derive(Debug, Clone)]
pub struct TimerSet {
    timers: Vec<(TimerKind, PeriodicTimer)>,
}

impl TimerSet {
    pub fn new(intervals: &TimerIntervals) -> Self {
        let timers = TimerKind::ALL
            .iter()
            .map(|&kind| (kind, PeriodicTimer::new(intervals.period(kind))))
            .collect();
        Self { timers }
    }

    /// Arm every timer relative to `now`.
    pub fn arm_all(&mut self, now: DateTime<Utc>) {
        for (_, timer) in &mut self.timers {
            timer.arm(now);
        }
    }

    /// Clear every timer in one step.
    pub fn cancel_all(&mut self) {
        for (_, timer) in &mut self.timers {
            timer.clear();
        }
    }

    /// Number of timers currently armed.
    pub fn armed_count(&self) -> usize {
        self.timers.iter().filter(|(_, t)| t.is_armed()).count()
    }

    pub fn next_due(&self, kind: TimerKind) -> Option<DateTime<Utc>> {
        self.timers
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, t)| t.next_due())
    }

    /// Fire the earliest timer due at or before `now`.
    ///
    /// Ties resolve in [`TimerKind::ALL`] order. Callers loop until `None`
    /// to process everything that became due.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(TimerKind, DateTime<Utc>)> {
        let (index, _) = self
            .timers
            .iter()
            .enumerate()
            .filter_map(|(i, (_, t))| t.next_due().filter(|due| *due <= now).map(|due| (i, due)))
            .min_by_key(|(_, due)| *due)?;
        let (kind, timer) = &mut self.timers[index];
        timer.fire_if_due(now).map(|at| (*kind, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn arm_and_cancel_cover_every_timer() {
        let mut set = TimerSet::new(&TimerIntervals::default());
        assert_eq!(set.armed_count(), 0);
        set.arm_all(t0());
        assert_eq!(set.armed_count(), TimerKind::ALL.len());
        set.cancel_all();
        assert_eq!(set.armed_count(), 0);
        assert!(set.pop_due(t0() + Duration::hours(2)).is_none());
    }

    #[test]
    fn pops_in_chronological_order() {
        let mut set = TimerSet::new(&TimerIntervals::default());
        set.arm_all(t0());

        let mut fired = Vec::new();
        while let Some((kind, at)) = set.pop_due(t0() + Duration::seconds(15)) {
            fired.push((kind, (at - t0()).num_seconds()));
        }

        let ticks = fired.iter().filter(|(k, _)| *k == TimerKind::SessionTick).count();
        let blinks = fired.iter().filter(|(k, _)| *k == TimerKind::BlinkSample).count();
        assert_eq!(ticks, 15);
        assert_eq!(blinks, 5);
        assert!(fired.contains(&(TimerKind::RateSample, 10)));
        assert!(fired.contains(&(TimerKind::FatigueCheck, 15)));
        assert!(fired.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn ties_resolve_in_declaration_order() {
        let mut set = TimerSet::new(&TimerIntervals::default());
        set.arm_all(t0());
        let at_three: Vec<TimerKind> = std::iter::from_fn(|| set.pop_due(t0() + Duration::seconds(3)))
            .filter(|(_, at)| *at == t0() + Duration::seconds(3))
            .map(|(k, _)| k)
            .collect();
        assert_eq!(at_three, vec![TimerKind::SessionTick, TimerKind::BlinkSample]);
    }
}
