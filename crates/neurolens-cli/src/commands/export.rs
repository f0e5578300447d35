use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use neurolens_core::report::{default_file_name, to_csv, to_html, ExportFormat};

use super::load_state;

#[derive(Subcommand)]
pub enum ExportAction {
    /// Tabular export, one row per session
    Csv {
        /// Output file (default: neurolens_sessions_<date>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Printable HTML report
    Html {
        /// Output file (default: neurolens_report_<date>.html)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: ExportAction) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state()?;
    let (format, output) = match action {
        ExportAction::Csv { output } => (ExportFormat::Csv, output),
        ExportAction::Html { output } => (ExportFormat::Html, output),
    };

    let content = match format {
        ExportFormat::Csv => to_csv(&state.history)?,
        ExportFormat::Html => to_html(&state.history)?,
    };
    let path = output
        .unwrap_or_else(|| PathBuf::from(default_file_name(format, Utc::now().date_naive())));
    std::fs::write(&path, content)?;
    tracing::info!(path = %path.display(), sessions = state.history.len(), "history exported");
    println!("{}", path.display());
    Ok(())
}
