use clap::Subcommand;
use serde_json::json;

use neurolens_core::metrics::BlinkRateHealth;
use neurolens_core::report::{daily_screen_time, format_duration, recommendations, summarize};
use neurolens_core::ValidationError;

use super::load_state;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List archived sessions, newest first
    List {
        /// Show at most N sessions
        #[arg(long)]
        limit: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one session with recommendations
    Show {
        /// Session ID
        id: String,
    },
    /// Aggregate figures and per-day screen time
    Summary,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;

    match action {
        HistoryAction::List { limit, json } => {
            let shown = &state.history[..limit.unwrap_or(usize::MAX).min(state.history.len())];
            if json {
                println!("{}", serde_json::to_string_pretty(shown)?);
                return Ok(());
            }
            if shown.is_empty() {
                println!("no sessions recorded");
                return Ok(());
            }
            for s in shown {
                println!(
                    "{}  {}  {:>9}  {:>3}/min  focus {:>3}%  strain {:>2}/10",
                    s.id,
                    s.start_time.format("%Y-%m-%d %H:%M"),
                    format_duration(s.duration_secs),
                    s.avg_blink_rate,
                    s.focus_score,
                    s.eye_strain_level,
                );
            }
        }
        HistoryAction::Show { id } => {
            let session = state
                .history
                .iter()
                .find(|s| s.id == id)
                .ok_or(ValidationError::UnknownSession(id))?;
            let report = json!({
                "session": session,
                "blink_rate_health": BlinkRateHealth::classify(session.avg_blink_rate),
                "recommendations": recommendations(session),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        HistoryAction::Summary => {
            let report = json!({
                "summary": summarize(&state.history),
                "daily_screen_time": daily_screen_time(&state.history),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
