//! Reports over archived session history: summaries, per-session
//! recommendations and CSV/HTML exports. Everything here is a pure
//! function of the history slice.

mod export;
mod summary;

pub use export::{default_file_name, to_csv, to_html, ExportFormat, CSV_HEADERS};
pub use summary::{
    daily_screen_time, format_clock, format_duration, minutes_until_break, recommendations,
    summarize, DailyScreenTime, HistorySummary,
};
