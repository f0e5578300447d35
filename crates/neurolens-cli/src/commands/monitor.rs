use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use tokio::time::{Instant, Interval};

use neurolens_core::report::{format_clock, recommendations};
use neurolens_core::{
    Config, Database, Event, FixedMetricSource, MonitorBuilder, MonitorRuntime, VirtualClock,
};

use crate::terminal::TerminalNotifier;

/// Real time between monitor advances at 1x speed.
const BASE_TICK_MS: f64 = 250.0;

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Run one monitoring session, printing events as JSON lines
    Run {
        /// Session length in simulated seconds
        #[arg(long, default_value = "60")]
        seconds: u64,
        /// Simulated seconds per real second
        #[arg(long, default_value = "1.0")]
        speed: f64,
        /// Seed for the random metric source and tip rotation
        #[arg(long)]
        seed: Option<u64>,
        /// Pin the blink rate (blinks per minute) instead of sampling it
        #[arg(long)]
        rate: Option<u32>,
        /// Record a gaze-away event every N simulated seconds
        #[arg(long)]
        gaze_away_every: Option<u64>,
    },
}

pub fn run(action: MonitorAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MonitorAction::Run {
            seconds,
            speed,
            seed,
            rate,
            gaze_away_every,
        } => {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(format!("speed must be positive, got {speed}").into());
            }
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(run_session(seconds, speed, seed, rate, gaze_away_every))
        }
    }
}

fn real(simulated_secs: u64, speed: f64) -> Duration {
    Duration::from_secs_f64(simulated_secs as f64 / speed)
}

async fn next_gaze(gaze: &mut Option<Interval>) {
    match gaze {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

async fn run_session(
    seconds: u64,
    speed: f64,
    seed: Option<u64>,
    rate: Option<u32>,
    gaze_away_every: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut builder = MonitorBuilder::from_config(config)
        .store(Database::open()?)
        .notifier(TerminalNotifier::detect());
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    if let Some(rate) = rate {
        builder = builder.metric_source(FixedMetricSource::new(rate));
    }

    let tick = Duration::from_secs_f64((BASE_TICK_MS / speed).clamp(1.0, BASE_TICK_MS) / 1000.0);
    let clock = VirtualClock::new(Utc::now(), speed);
    let (runtime, mut events) = MonitorRuntime::spawn(builder.build(), clock, tick);
    tracing::debug!(seconds, speed, ?tick, "monitor session starting");

    runtime.set_monitoring(true).await?;

    let deadline = tokio::time::sleep(real(seconds, speed));
    tokio::pin!(deadline);
    let mut gaze = gaze_away_every.filter(|n| *n > 0).map(|n| {
        let period = real(n, speed);
        tokio::time::interval_at(Instant::now() + period, period)
    });

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some(event) = events.recv() => print_event(&event)?,
            _ = next_gaze(&mut gaze) => runtime.gaze_away().await?,
        }
    }

    let monitor = runtime.shutdown().await?;
    while let Ok(event) = events.try_recv() {
        print_event(&event)?;
    }

    if let Some(session) = monitor.history().first() {
        eprintln!(
            "session {} ended after {} with focus {}%",
            session.id,
            format_clock(session.duration_secs),
            session.focus_score
        );
        for tip in recommendations(session) {
            eprintln!("  - {tip}");
        }
    }
    Ok(())
}
