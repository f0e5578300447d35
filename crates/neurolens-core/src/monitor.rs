//! The monitoring context.
//!
//! [`Monitor`] owns the monitoring flag, the user preferences and every
//! component: metric simulator, session tracker, reminder scheduler and
//! fatigue watchdog, plus the single [`TimerSet`] that drives them. It is
//! a synchronous state machine over caller-supplied wall-clock instants,
//! like the timer engine of a desktop app: the caller invokes
//! [`Monitor::advance`] periodically and renders the returned events.

use chrono::{DateTime, Utc};

use crate::capture::{CaptureDevice, SimulatedCamera};
use crate::error::Result;
use crate::events::Event;
use crate::fatigue::{FatigueVerdict, FatigueWatchdog};
use crate::metrics::{eye_strain_level, MetricSimulator, MetricSource};
use crate::notify::{
    Dispatcher, Notification, NotificationKind, Notifier, Permission, Preferences, Severity,
    TracingNotifier,
};
use crate::reminder::ReminderScheduler;
use crate::session::{SessionOutcome, SessionRecord, SessionTracker};
use crate::storage::{Config, MemoryStore, SessionStore};
use crate::timer::{TimerKind, TimerSet};

/// Assembles a [`Monitor`] from configuration and host capabilities.
///
/// Anything not supplied falls back to a simulation-friendly default:
/// random metrics, tracing-only notifications, a camera that grants
/// access, and an in-memory store.
pub struct MonitorBuilder {
    config: Config,
    seed: Option<u64>,
    source: Option<Box<dyn MetricSource>>,
    notifier: Option<Box<dyn Notifier>>,
    camera: Option<Box<dyn CaptureDevice>>,
    store: Option<Box<dyn SessionStore>>,
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorBuilder {
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            seed: None,
            source: None,
            notifier: None,
            camera: None,
            store: None,
        }
    }

    /// Seed for the random metric source and tip rotation.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn preferences(mut self, preferences: Preferences) -> Self {
        self.config.preferences = preferences;
        self
    }

    pub fn metric_source(mut self, source: impl MetricSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn capture_device(mut self, camera: impl CaptureDevice + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    pub fn store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Build the monitor, restoring persisted state from the store and
    /// asking the notifier for permission once.
    pub fn build(self) -> Monitor {
        let config = self.config;
        let seed = self.seed;

        let source = self
            .source
            .unwrap_or_else(|| Box::new(config.metric_source(seed)));
        let store = self.store.unwrap_or_else(|| Box::new(MemoryStore::new()));
        let state = store.load_state(config.history_limit);

        let mut dispatcher = Dispatcher::new(
            self.notifier
                .unwrap_or_else(|| Box::new(TracingNotifier::default())),
        );
        dispatcher.request_permission();

        Monitor {
            monitoring: false,
            preferences: config.preferences,
            simulator: MetricSimulator::new(source),
            tracker: SessionTracker::restore(state, config.history_limit),
            reminders: ReminderScheduler::new(&config.reminder_settings(), seed),
            watchdog: config.watchdog(),
            timers: TimerSet::new(&config.timer_intervals()),
            dispatcher,
            camera: self
                .camera
                .unwrap_or_else(|| Box::new(SimulatedCamera::granted())),
            store,
        }
    }
}

pub struct Monitor {
    monitoring: bool,
    preferences: Preferences,
    simulator: MetricSimulator,
    tracker: SessionTracker,
    reminders: ReminderScheduler,
    watchdog: FatigueWatchdog,
    timers: TimerSet,
    dispatcher: Dispatcher,
    camera: Box<dyn CaptureDevice>,
    store: Box<dyn SessionStore>,
}

impl Monitor {
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn blink_rate(&self) -> u32 {
        self.simulator.blink_rate()
    }

    pub fn permission(&self) -> Permission {
        self.dispatcher.permission()
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn current_session(&self) -> Option<&SessionRecord> {
        self.tracker.current()
    }

    pub fn history(&self) -> &[SessionRecord] {
        self.tracker.history()
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            monitoring: self.monitoring,
            blink_rate: self.simulator.blink_rate(),
            session: self.tracker.current().cloned(),
            total_sessions: self.tracker.total_sessions(),
            streak: self.tracker.streak(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Turn monitoring on: open the camera, arm every timer and start a
    /// session. A no-op when already monitoring.
    ///
    /// # Errors
    /// Returns [`PermissionError::Camera`](crate::error::PermissionError::Camera) when the camera is refused. A
    /// toast is raised and monitoring stays off.
    pub fn start_monitoring(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        if self.monitoring {
            return Ok(Vec::new());
        }

        if let Err(e) = self.camera.acquire() {
            tracing::warn!(error = %e, "monitoring not started");
            self.dispatcher.toast(&camera_denied());
            return Err(e.into());
        }

        self.monitoring = true;
        self.timers.arm_all(now);
        tracing::info!(armed = self.timers.armed_count(), "monitoring started");

        let mut events = vec![Event::MonitoringStarted { at: now }];
        if let Some(session) = self.tracker.begin(now) {
            events.push(Event::SessionStarted {
                session_id: session.id.clone(),
                at: now,
            });
        }

        // The low-blink check also runs once when monitoring begins.
        let rate = self.simulator.blink_rate();
        if let Some(reminder) = self.reminders.observe_blink_rate(now, rate) {
            self.raise(reminder, now, &mut events);
        }
        Ok(events)
    }

    /// Turn monitoring off: clear every timer, release the camera and
    /// archive the active session. A no-op when not monitoring.
    pub fn stop_monitoring(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if !self.monitoring {
            return Vec::new();
        }

        self.monitoring = false;
        self.timers.cancel_all();
        self.camera.release();

        let mut events = Vec::new();
        if let Some(outcome) = self.tracker.finish(now) {
            self.persist();
            push_outcome(outcome, now, &mut events);
        }
        events.push(Event::MonitoringStopped { at: now });
        tracing::info!("monitoring stopped");
        events
    }

    pub fn set_monitoring(&mut self, on: bool, now: DateTime<Utc>) -> Result<Vec<Event>> {
        if on {
            self.start_monitoring(now)
        } else {
            Ok(self.stop_monitoring(now))
        }
    }

    /// Count a gaze-away event against the active session.
    pub fn record_gaze_away(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.monitoring {
            return None;
        }
        let gaze_away_count = self.tracker.record_gaze_away()?;
        Some(Event::GazeAwayRecorded {
            gaze_away_count,
            at: now,
        })
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        tracing::debug!(?preferences, "preferences updated");
        self.preferences = preferences;
    }

    /// Fire every timer due at or before `now`, oldest first.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some((kind, at)) = self.timers.pop_due(now) {
            self.fire(kind, at, &mut events);
        }
        events
    }

    /// Release everything. An active session is archived first.
    pub fn teardown(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let events = self.stop_monitoring(now);
        self.timers.cancel_all();
        events
    }

    // ── Timer handlers ───────────────────────────────────────────────

    fn fire(&mut self, kind: TimerKind, at: DateTime<Utc>, events: &mut Vec<Event>) {
        tracing::trace!(timer = kind.as_str(), %at, "timer fired");
        match kind {
            TimerKind::SessionTick => {
                let rate = self.simulator.blink_rate();
                if let Some(session) = self.tracker.tick(rate) {
                    events.push(Event::SessionTicked {
                        session_id: session.id.clone(),
                        duration_secs: session.duration_secs,
                        avg_blink_rate: session.avg_blink_rate,
                        focus_score: session.focus_score,
                        at,
                    });
                }
            }
            TimerKind::BlinkSample => {
                if self.simulator.sample_blink() {
                    if let Some(blink_count) = self.tracker.record_blink() {
                        events.push(Event::BlinkDetected { blink_count, at });
                    }
                }
            }
            TimerKind::RateSample => self.on_rate_sample(at, events),
            TimerKind::BreakReminder => {
                let reminder = self.reminders.break_reminder();
                self.raise(reminder, at, events);
            }
            TimerKind::HealthTip => {
                if self.preferences.reduced_alerts {
                    tracing::debug!("health tip suppressed by reduced alerts");
                    return;
                }
                let tip = self.reminders.health_tip();
                self.raise(tip, at, events);
            }
            TimerKind::FatigueCheck => self.on_fatigue_check(at, events),
        }
    }

    fn on_rate_sample(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        let blink_rate = self.simulator.sample_rate();
        events.push(Event::BlinkRateSampled { blink_rate, at });

        if let Some(duration) = self.tracker.current().map(|s| s.duration_secs) {
            let level = eye_strain_level(duration, blink_rate);
            if let Some(eye_strain_level) = self.tracker.update_eye_strain(level) {
                let focus_score = self.tracker.current().map_or(0, |s| s.focus_score);
                events.push(Event::EyeStrainUpdated {
                    eye_strain_level,
                    focus_score,
                    at,
                });
            }
        }

        if let Some(reminder) = self.reminders.observe_blink_rate(at, blink_rate) {
            self.raise(reminder, at, events);
        }
    }

    fn on_fatigue_check(&mut self, at: DateTime<Utc>, events: &mut Vec<Event>) {
        let blink_rate = self.simulator.blink_rate();
        let verdict = self.watchdog.check(blink_rate);
        let Some(notification) = FatigueWatchdog::notification(verdict) else {
            return;
        };

        let delivery = match verdict {
            FatigueVerdict::Fatigued => {
                let fatigue_detections = self.tracker.record_fatigue().unwrap_or(0);
                let focus_score = self.tracker.current().map_or(0, |s| s.focus_score);
                tracing::info!(blink_rate, fatigue_detections, "fatigue detected");
                events.push(Event::FatigueDetected {
                    blink_rate,
                    fatigue_detections,
                    focus_score,
                    at,
                });
                self.dispatcher.alert(&notification)
            }
            _ => {
                events.push(Event::DrowsinessAdvisory { blink_rate, at });
                self.dispatcher.toast(&notification)
            }
        };
        events.push(Event::NotificationRaised {
            notification,
            delivery,
            at,
        });
    }

    fn raise(&mut self, notification: Notification, at: DateTime<Utc>, events: &mut Vec<Event>) {
        let delivery = self.dispatcher.notify(&notification, &self.preferences);
        events.push(Event::NotificationRaised {
            notification,
            delivery,
            at,
        });
    }

    /// Fire-and-forget: a failed write is logged and the in-memory state
    /// stays authoritative.
    fn persist(&mut self) {
        let result = self
            .store
            .save_history(self.tracker.history())
            .and_then(|()| self.store.save_total_sessions(self.tracker.total_sessions()))
            .and_then(|()| self.store.save_streak(self.tracker.streak()))
            .and_then(|()| {
                self.store
                    .save_achievements(self.tracker.achievements().unlocked())
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session state");
        }
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("monitoring", &self.monitoring)
            .field("preferences", &self.preferences)
            .field("simulator", &self.simulator)
            .field("tracker", &self.tracker)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

fn push_outcome(outcome: SessionOutcome, at: DateTime<Utc>, events: &mut Vec<Event>) {
    let SessionOutcome {
        session,
        total_sessions,
        unlocked,
    } = outcome;
    events.push(Event::SessionEnded {
        session,
        total_sessions,
        at,
    });
    for achievement in unlocked {
        events.push(Event::AchievementUnlocked { achievement, at });
    }
}

fn camera_denied() -> Notification {
    Notification::new(
        NotificationKind::Camera,
        Severity::Critical,
        "📷 Camera Access Denied",
        "Allow camera access in your system settings to start eye monitoring.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FixedMetricSource;
    use crate::notify::{Delivered, RecordingNotifier};
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn secs(n: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(n)
    }

    fn monitor_with(rate: u32, notifier: RecordingNotifier) -> Monitor {
        Monitor::builder()
            .metric_source(FixedMetricSource::without_blinks(rate))
            .notifier(notifier)
            .seed(1)
            .build()
    }

    #[test]
    fn start_arms_timers_and_opens_session() {
        let mut m = monitor_with(17, RecordingNotifier::new(Permission::Granted));
        let events = m.start_monitoring(t0()).unwrap();
        assert!(m.is_monitoring());
        assert_eq!(m.timers().armed_count(), TimerKind::ALL.len());
        assert!(matches!(events[0], Event::MonitoringStarted { .. }));
        assert!(matches!(events[1], Event::SessionStarted { .. }));
        assert!(m.start_monitoring(secs(1)).unwrap().is_empty());
    }

    #[test]
    fn stop_clears_timers_and_archives() {
        let mut m = monitor_with(17, RecordingNotifier::new(Permission::Granted));
        m.start_monitoring(t0()).unwrap();
        m.advance(secs(5));
        let events = m.stop_monitoring(secs(5));
        assert_eq!(m.timers().armed_count(), 0);
        assert!(m.current_session().is_none());
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.history()[0].duration_secs, 5);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AchievementUnlocked { .. })));

        // Nothing fires after monitoring is off.
        assert!(m.advance(secs(60)).is_empty());
    }

    #[test]
    fn denied_camera_keeps_monitoring_off() {
        let notifier = RecordingNotifier::new(Permission::Granted);
        let mut m = Monitor::builder()
            .notifier(notifier.clone())
            .capture_device(SimulatedCamera::denied())
            .build();
        let err = m.start_monitoring(t0()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Permission(crate::error::PermissionError::Camera)
        ));
        assert!(!m.is_monitoring());
        assert!(m.current_session().is_none());
        assert_eq!(m.timers().armed_count(), 0);
        assert_eq!(notifier.toasts()[0].kind, NotificationKind::Camera);
    }

    #[test]
    fn sustained_low_rate_fires_every_check() {
        let notifier = RecordingNotifier::new(Permission::Granted);
        let mut m = monitor_with(5, notifier.clone());
        m.start_monitoring(t0()).unwrap();
        let events = m.advance(secs(31));
        let fatigue_at: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::FatigueDetected { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(fatigue_at, vec![secs(15), secs(30)]);
        assert_eq!(m.current_session().unwrap().fatigue_detections, 2);

        // Fatigue alerts reach the system channel but never chime.
        let delivered = notifier.delivered();
        assert!(delivered
            .iter()
            .any(|d| matches!(d, Delivered::System(n) if n.kind == NotificationKind::Fatigue)));
    }

    #[test]
    fn drowsy_band_is_toast_only() {
        let notifier = RecordingNotifier::new(Permission::Granted);
        let mut m = monitor_with(9, notifier.clone());
        m.start_monitoring(t0()).unwrap();
        let events = m.advance(secs(15));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::DrowsinessAdvisory { blink_rate: 9, .. })));
        assert_eq!(m.current_session().unwrap().fatigue_detections, 0);
        assert!(!notifier
            .delivered()
            .iter()
            .any(|d| matches!(d, Delivered::System(n) if n.kind == NotificationKind::Drowsiness)));
    }

    #[test]
    fn reduced_alerts_suppress_health_tips() {
        let notifier = RecordingNotifier::new(Permission::Granted);
        let mut m = monitor_with(17, notifier.clone());
        m.set_preferences(Preferences {
            reduced_alerts: true,
            ..Preferences::default()
        });
        m.start_monitoring(t0()).unwrap();
        m.advance(secs(30 * 60));
        let kinds: Vec<_> = notifier.toasts().iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NotificationKind::BreakReminder));
        assert!(!kinds.contains(&NotificationKind::HealthTip));
    }

    #[test]
    fn gaze_away_requires_monitoring() {
        let mut m = monitor_with(17, RecordingNotifier::new(Permission::Granted));
        assert!(m.record_gaze_away(t0()).is_none());
        m.start_monitoring(t0()).unwrap();
        assert!(matches!(
            m.record_gaze_away(secs(1)),
            Some(Event::GazeAwayRecorded { gaze_away_count: 1, .. })
        ));
    }

    #[test]
    fn teardown_archives_active_session() {
        let mut m = monitor_with(17, RecordingNotifier::new(Permission::Granted));
        m.start_monitoring(t0()).unwrap();
        m.advance(secs(3));
        m.teardown(secs(3));
        assert!(!m.is_monitoring());
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.timers().armed_count(), 0);
    }
}
