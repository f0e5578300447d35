use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod terminal;

#[derive(Parser)]
#[command(name = "neurolens-cli", version, about = "NeuroLens eye-health monitor CLI")]
struct Cli {
    /// Enable debug logging (overridden by NEUROLENS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live monitoring sessions
    Monitor {
        #[command(subcommand)]
        action: commands::monitor::MonitorAction,
    },
    /// Archived session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Achievement gallery
    Achievements {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals, streak and history summary
    Stats,
    /// Export the session history
    Export {
        #[command(subcommand)]
        action: commands::export::ExportAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Monitor { action } => commands::monitor::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Achievements { json } => commands::achievements::run(json),
        Commands::Stats => commands::stats::run(),
        Commands::Export { action } => commands::export::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
