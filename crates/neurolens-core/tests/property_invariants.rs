use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use neurolens_core::metrics::FixedMetricSource;
use neurolens_core::reminder::{ReminderScheduler, ReminderSettings};
use neurolens_core::session::{focus_score, SessionTracker};
use neurolens_core::Monitor;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[derive(Debug, Clone)]
enum Op {
    Tick(u32),
    Strain(u8),
    Fatigue,
    Blink,
    GazeAway,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_u32..40).prop_map(Op::Tick),
        any::<u8>().prop_map(Op::Strain),
        Just(Op::Fatigue),
        Just(Op::Blink),
        Just(Op::GazeAway),
    ]
}

proptest! {
    #[test]
    fn pt_focus_matches_formula_after_every_mutation(ops in prop::collection::vec(op(), 0..200)) {
        let mut tracker = SessionTracker::default();
        tracker.begin(t0());
        for op in ops {
            match op {
                Op::Tick(rate) => { tracker.tick(rate); }
                Op::Strain(level) => { tracker.update_eye_strain(level); }
                Op::Fatigue => { tracker.record_fatigue(); }
                Op::Blink => { tracker.record_blink(); }
                Op::GazeAway => { tracker.record_gaze_away(); }
            }
            let s = tracker.current().unwrap();
            prop_assert!(s.focus_score <= 100);
            prop_assert!(s.eye_strain_level <= 10);
            prop_assert_eq!(s.focus_score, focus_score(s.eye_strain_level, s.fatigue_detections));
        }
    }

    #[test]
    fn pt_history_keeps_newest_thirty(sessions in 0_usize..80) {
        let mut tracker = SessionTracker::default();
        let mut last_id = None;
        for i in 0..sessions {
            let start = t0() + Duration::minutes(i as i64);
            last_id = tracker.begin(start).map(|s| s.id.clone());
            tracker.finish(start + Duration::seconds(30));
        }
        prop_assert_eq!(tracker.history().len(), sessions.min(30));
        prop_assert_eq!(tracker.total_sessions(), sessions as u64);
        prop_assert_eq!(tracker.history().first().map(|s| s.id.clone()), last_id);
        prop_assert!(tracker
            .history()
            .windows(2)
            .all(|w| w[0].start_time > w[1].start_time));
    }

    #[test]
    fn pt_duration_never_decreases(steps in prop::collection::vec(0_i64..20, 1..40)) {
        let mut m = Monitor::builder()
            .metric_source(FixedMetricSource::new(16))
            .seed(5)
            .build();
        m.start_monitoring(t0()).unwrap();

        let mut now = t0();
        let mut last = 0;
        for step in steps {
            now += Duration::seconds(step);
            m.advance(now);
            let duration = m.current_session().unwrap().duration_secs;
            prop_assert!(duration >= last);
            prop_assert_eq!(duration as i64, (now - t0()).num_seconds());
            last = duration;
        }

        m.stop_monitoring(now);
        m.advance(now + Duration::minutes(5));
        prop_assert_eq!(m.history()[0].duration_secs, last);
    }

    #[test]
    fn pt_low_blink_reminders_are_spaced(
        mut offsets in prop::collection::vec(0_i64..600, 1..60),
        rate in 0_u32..12,
    ) {
        offsets.sort_unstable();
        let mut reminders = ReminderScheduler::new(&ReminderSettings::default(), Some(1));
        let fired: Vec<_> = offsets
            .into_iter()
            .map(|s| t0() + Duration::seconds(s))
            .filter(|now| reminders.observe_blink_rate(*now, rate).is_some())
            .collect();
        prop_assert!(!fired.is_empty());
        prop_assert!(fired.windows(2).all(|w| w[1] - w[0] >= Duration::seconds(30)));
    }
}
