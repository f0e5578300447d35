//! Async host for a [`Monitor`].
//!
//! One tokio task owns the monitor. A ticker drives
//! [`Monitor::advance`]; callers talk to the task through
//! [`MonitorRuntime`], which turns each call into a [`Command`] and waits
//! for the reply. Every event the monitor produces is forwarded on an
//! unbounded channel.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::monitor::Monitor;
use crate::notify::Preferences;

const COMMAND_BUFFER: usize = 32;

/// Maps tokio's monotonic clock onto wall-clock time, optionally sped up.
///
/// Under a paused tokio runtime the clock only moves when tokio time does.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    origin: DateTime<Utc>,
    started: Instant,
    speed: f64,
}

impl VirtualClock {
    /// `speed` is clamped to be positive; 1.0 is real time.
    pub fn new(origin: DateTime<Utc>, speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        Self {
            origin,
            started: Instant::now(),
            speed,
        }
    }

    pub fn real_time() -> Self {
        Self::new(Utc::now(), 1.0)
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0 * self.speed;
        self.origin + ChronoDuration::milliseconds(elapsed_ms as i64)
    }
}

#[derive(Debug)]
pub enum Command {
    SetMonitoring {
        on: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    GazeAway,
    SetPreferences(Preferences),
    Snapshot {
        reply: oneshot::Sender<Event>,
    },
    Shutdown {
        reply: oneshot::Sender<Monitor>,
    },
}

/// Handle to the task that owns a [`Monitor`].
pub struct MonitorRuntime {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl MonitorRuntime {
    /// Move `monitor` into a new task. `tick` is the real (tokio) interval
    /// between [`Monitor::advance`] calls.
    pub fn spawn(
        monitor: Monitor,
        clock: VirtualClock,
        tick: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(monitor, clock, tick, command_rx, event_tx));
        (
            Self {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    pub async fn set_monitoring(&self, on: bool) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetMonitoring { on, reply }).await?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)?
    }

    pub async fn gaze_away(&self) -> Result<()> {
        self.send(Command::GazeAway).await
    }

    pub async fn set_preferences(&self, preferences: Preferences) -> Result<()> {
        self.send(Command::SetPreferences(preferences)).await
    }

    pub async fn snapshot(&self) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)
    }

    /// Stop monitoring (archiving any active session), end the task and
    /// hand the monitor back.
    pub async fn shutdown(self) -> Result<Monitor> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        let monitor = rx.await.map_err(|_| CoreError::RuntimeClosed)?;
        self.task.await?;
        Ok(monitor)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::RuntimeClosed)
    }
}

async fn run(
    mut monitor: Monitor,
    clock: VirtualClock,
    tick: Duration,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let forward = |batch: Vec<Event>| {
        for event in batch {
            // A dropped receiver only means nobody is listening.
            let _ = events.send(event);
        }
    };

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                forward(monitor.advance(clock.now()));
            }
            command = commands.recv() => {
                let now = clock.now();
                // Catch up before acting so commands see current state.
                forward(monitor.advance(now));

                let Some(command) = command else {
                    tracing::debug!("all runtime handles dropped");
                    forward(monitor.teardown(now));
                    break;
                };

                match command {
                    Command::SetMonitoring { on, reply } => {
                        let result = monitor.set_monitoring(on, now).map(|batch| forward(batch));
                        let _ = reply.send(result);
                    }
                    Command::GazeAway => {
                        forward(monitor.record_gaze_away(now).into_iter().collect());
                    }
                    Command::SetPreferences(preferences) => monitor.set_preferences(preferences),
                    Command::Snapshot { reply } => {
                        let _ = reply.send(monitor.snapshot(now));
                    }
                    Command::Shutdown { reply } => {
                        forward(monitor.teardown(now));
                        tracing::info!("monitor runtime stopped");
                        let _ = reply.send(monitor);
                        return;
                    }
                }
            }
        }
    }
}
