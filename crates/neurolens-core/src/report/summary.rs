use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Aggregates over a session history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_sessions: usize,
    /// Mean focus score, one decimal.
    pub avg_focus_score: f64,
    /// Total monitored time in hours, one decimal.
    pub total_hours: f64,
    pub total_blinks: u64,
    pub total_fatigue_detections: u64,
}

/// Monitored time for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyScreenTime {
    pub date: NaiveDate,
    pub sessions: usize,
    pub total_secs: u64,
}

impl DailyScreenTime {
    pub fn hours(&self) -> f64 {
        round1(self.total_secs as f64 / 3600.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn summarize(history: &[SessionRecord]) -> HistorySummary {
    if history.is_empty() {
        return HistorySummary::default();
    }
    let focus_total: u64 = history.iter().map(|s| u64::from(s.focus_score)).sum();
    let secs_total: u64 = history.iter().map(|s| s.duration_secs).sum();
    HistorySummary {
        total_sessions: history.len(),
        avg_focus_score: round1(focus_total as f64 / history.len() as f64),
        total_hours: round1(secs_total as f64 / 3600.0),
        total_blinks: history.iter().map(|s| s.blink_count).sum(),
        total_fatigue_detections: history.iter().map(|s| s.fatigue_detections).sum(),
    }
}

/// Screen time grouped by the day each session started, oldest day first.
pub fn daily_screen_time(history: &[SessionRecord]) -> Vec<DailyScreenTime> {
    let mut days: BTreeMap<NaiveDate, (usize, u64)> = BTreeMap::new();
    for session in history {
        let entry = days.entry(session.start_time.date_naive()).or_default();
        entry.0 += 1;
        entry.1 += session.duration_secs;
    }
    days.into_iter()
        .map(|(date, (sessions, total_secs))| DailyScreenTime {
            date,
            sessions,
            total_secs,
        })
        .collect()
}

/// Advice for a finished (or running) session. Empty when nothing stands out.
pub fn recommendations(session: &SessionRecord) -> Vec<&'static str> {
    let mut out = Vec::new();
    if session.avg_blink_rate < 12 {
        out.push("Increase blink frequency - try the 20-20-20 rule");
    }
    if session.eye_strain_level > 5 {
        out.push("Reduce screen brightness and take more breaks");
    }
    if session.focus_score < 70 {
        out.push("Maintain better posture and minimize distractions");
    }
    if session.fatigue_detections > 3 {
        out.push("Get adequate sleep and take longer breaks");
    }
    out
}

/// `HH:MM:SS`; hours grow past two digits if needed.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `Xm Ys`.
pub fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Whole minutes (rounded up) until the next break boundary.
pub fn minutes_until_break(elapsed_secs: u64, interval_secs: u64) -> u64 {
    if interval_secs == 0 {
        return 0;
    }
    let remaining = interval_secs - elapsed_secs % interval_secs;
    remaining.div_ceil(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn session_at(start: &str, duration_secs: u64, focus_score: u8) -> SessionRecord {
        let start = DateTime::parse_from_rfc3339(start)
            .unwrap()
            .with_timezone(&Utc);
        let mut s = SessionRecord::new(start);
        s.duration_secs = duration_secs;
        s.focus_score = focus_score;
        s.end_time = Some(start + Duration::seconds(duration_secs as i64));
        s
    }

    #[test]
    fn summary_rounds_to_one_decimal() {
        let history = vec![
            session_at("2026-03-02T09:00:00Z", 3600, 90),
            session_at("2026-03-01T09:00:00Z", 1800, 85),
            session_at("2026-03-01T14:00:00Z", 600, 70),
        ];
        let summary = summarize(&history);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.avg_focus_score, 81.7);
        assert_eq!(summary.total_hours, 1.7);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize(&[]), HistorySummary::default());
    }

    #[test]
    fn daily_screen_time_groups_by_start_day() {
        let history = vec![
            session_at("2026-03-02T09:00:00Z", 3600, 90),
            session_at("2026-03-01T09:00:00Z", 1800, 85),
            session_at("2026-03-01T14:00:00Z", 600, 70),
        ];
        let days = daily_screen_time(&history);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(days[0].sessions, 2);
        assert_eq!(days[0].total_secs, 2400);
        assert_eq!(days[1].hours(), 1.0);
    }

    #[test]
    fn recommendation_thresholds() {
        let mut s = session_at("2026-03-01T09:00:00Z", 60, 100);
        s.avg_blink_rate = 17;
        assert!(recommendations(&s).is_empty());

        s.avg_blink_rate = 11;
        s.eye_strain_level = 6;
        s.focus_score = 69;
        s.fatigue_detections = 4;
        assert_eq!(recommendations(&s).len(), 4);

        s.avg_blink_rate = 12;
        s.eye_strain_level = 5;
        s.focus_score = 70;
        s.fatigue_detections = 3;
        assert!(recommendations(&s).is_empty());
    }

    #[test]
    fn clock_and_duration_formats() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3725), "01:02:05");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(59), "0m 59s");
    }

    #[test]
    fn minutes_until_next_break() {
        assert_eq!(minutes_until_break(0, 1200), 20);
        assert_eq!(minutes_until_break(61, 1200), 19);
        assert_eq!(minutes_until_break(1199, 1200), 1);
        assert_eq!(minutes_until_break(1200, 1200), 20);
    }
}
