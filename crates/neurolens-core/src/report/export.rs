//! CSV and printable HTML exports of the session history.

use std::fmt::Write as _;

use chrono::{NaiveDate, SecondsFormat};
use indoc::formatdoc;
use serde::{Deserialize, Serialize};

use super::summary::{format_duration, summarize};
use crate::error::ValidationError;
use crate::session::SessionRecord;

pub const CSV_HEADERS: [&str; 10] = [
    "Session ID",
    "Start Time",
    "End Time",
    "Duration (min)",
    "Blink Count",
    "Avg Blink Rate",
    "Focus Score",
    "Eye Strain Level",
    "Gaze Away Count",
    "Fatigue Detections",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }
}

/// `neurolens_sessions_<date>.csv` or `neurolens_report_<date>.html`.
pub fn default_file_name(format: ExportFormat, date: NaiveDate) -> String {
    let stem = match format {
        ExportFormat::Csv => "neurolens_sessions",
        ExportFormat::Html => "neurolens_report",
    };
    format!("{stem}_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One header row plus one row per session, in history order.
pub fn to_csv(history: &[SessionRecord]) -> Result<String, ValidationError> {
    if history.is_empty() {
        return Err(ValidationError::EmptyHistory);
    }

    let mut out = CSV_HEADERS.join(",");
    for s in history {
        let end = s
            .end_time
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "Ongoing".to_string());
        let row = [
            csv_field(&s.id),
            s.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            end,
            format!("{:.2}", s.duration_minutes()),
            s.blink_count.to_string(),
            s.avg_blink_rate.to_string(),
            s.focus_score.to_string(),
            s.eye_strain_level.to_string(),
            s.gaze_away_count.to_string(),
            s.fatigue_detections.to_string(),
        ];
        out.push('\n');
        out.push_str(&row.join(","));
    }
    Ok(out)
}

/// Self-contained report that opens the print dialog when loaded.
pub fn to_html(history: &[SessionRecord]) -> Result<String, ValidationError> {
    if history.is_empty() {
        return Err(ValidationError::EmptyHistory);
    }

    let summary = summarize(history);
    let mut rows = String::new();
    for s in history {
        let _ = write!(
            rows,
            "\n        <tr><td>{}</td><td>{}</td><td>{}/min</td><td>{}%</td><td>{}/10</td></tr>",
            s.start_time.format("%Y-%m-%d"),
            format_duration(s.duration_secs),
            s.avg_blink_rate,
            s.focus_score,
            s.eye_strain_level,
        );
    }

    Ok(formatdoc! {r#"
        <!DOCTYPE html>
        <html>
        <head>
          <meta charset="utf-8">
          <title>NeuroLens Session Report</title>
          <style>
            body {{ font-family: Arial, sans-serif; padding: 40px; background: #0a0a0a; color: #fff; }}
            h1 {{ color: #00d9ff; text-align: center; margin-bottom: 30px; }}
            .summary {{ background: #1a1a1a; padding: 20px; border-radius: 10px; margin-bottom: 30px; }}
            table {{ width: 100%; border-collapse: collapse; background: #1a1a1a; }}
            th, td {{ padding: 12px; text-align: left; border-bottom: 1px solid #333; }}
            th {{ background: #00d9ff; color: #000; font-weight: bold; }}
            .metric {{ display: inline-block; margin: 10px 20px; }}
            .metric-label {{ color: #888; font-size: 12px; }}
            .metric-value {{ color: #00d9ff; font-size: 24px; font-weight: bold; }}
          </style>
        </head>
        <body>
          <h1>NeuroLens Session Report</h1>
          <div class="summary">
            <h2>Overview</h2>
            <div class="metric"><div class="metric-label">Total Sessions</div><div class="metric-value">{total}</div></div>
            <div class="metric"><div class="metric-label">Avg Focus Score</div><div class="metric-value">{focus:.1}</div></div>
            <div class="metric"><div class="metric-label">Total Time (hrs)</div><div class="metric-value">{hours:.1}</div></div>
          </div>
          <table>
            <thead>
              <tr><th>Date</th><th>Duration</th><th>Blink Rate</th><th>Focus Score</th><th>Eye Strain</th></tr>
            </thead>
            <tbody>{rows}
            </tbody>
          </table>
          <script>window.onload = () => window.print();</script>
        </body>
        </html>
        "#,
        total = summary.total_sessions,
        focus = summary.avg_focus_score,
        hours = summary.total_hours,
        rows = rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn finished(duration_secs: u64) -> SessionRecord {
        let start = DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut s = SessionRecord::new(start);
        s.duration_secs = duration_secs;
        s.avg_blink_rate = 16;
        s.focus_score = 80;
        s.eye_strain_level = 2;
        s.end_time = Some(start + Duration::seconds(duration_secs as i64));
        s
    }

    #[test]
    fn csv_duration_minutes_have_two_decimals() {
        let csv = to_csv(&[finished(90), finished(125)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        let durations: Vec<&str> = lines[1..]
            .iter()
            .map(|l| l.split(',').nth(3).unwrap())
            .collect();
        assert_eq!(durations, vec!["1.50", "2.08"]);
    }

    #[test]
    fn csv_marks_open_sessions_ongoing() {
        let mut s = finished(10);
        s.end_time = None;
        let csv = to_csv(&[s]).unwrap();
        let row: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row.len(), 10);
        assert_eq!(row[2], "Ongoing");
    }

    #[test]
    fn empty_history_is_rejected() {
        assert!(matches!(to_csv(&[]), Err(ValidationError::EmptyHistory)));
        assert!(matches!(to_html(&[]), Err(ValidationError::EmptyHistory)));
    }

    #[test]
    fn html_formats_metrics() {
        let html = to_html(&[finished(125)]).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<td>2m 5s</td>"));
        assert!(html.contains("<td>16/min</td>"));
        assert!(html.contains("<td>80%</td>"));
        assert!(html.contains("<td>2/10</td>"));
        assert!(html.contains(">80.0</div>"));
    }

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            default_file_name(ExportFormat::Csv, date),
            "neurolens_sessions_2026-03-01.csv"
        );
        assert_eq!(
            default_file_name(ExportFormat::Html, date),
            "neurolens_report_2026-03-01.html"
        );
    }
}
