//! # NeuroLens Core Library
//!
//! This library provides the core logic of the NeuroLens eye-health monitor.
//! It follows a CLI-first philosophy: every operation is available through
//! the standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Monitor**: a wall-clock-driven state machine that owns the monitoring
//!   flag, the preferences and every component. The caller periodically
//!   invokes `advance()`; each call fires the timers that became due.
//! - **Components**: metric simulator, session tracker with achievements,
//!   reminder scheduler and fatigue watchdog
//! - **Runtime**: a tokio task owning one `Monitor`, fed by commands
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Reports**: summaries and CSV/HTML exports of the session history
//!
//! ## Key Components
//!
//! - [`Monitor`]: monitoring context and timer dispatch
//! - [`MonitorRuntime`]: async host for a monitor
//! - [`SessionTracker`]: session lifecycle and achievement evaluation
//! - [`Database`]: persisted history, achievements and counters
//! - [`Config`]: application configuration management

pub mod capture;
pub mod error;
pub mod events;
pub mod fatigue;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod reminder;
pub mod report;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod timer;

pub use capture::{CaptureDevice, SimulatedCamera};
pub use error::{ConfigError, CoreError, DatabaseError, PermissionError, ValidationError};
pub use events::Event;
pub use fatigue::{FatigueVerdict, FatigueWatchdog};
pub use metrics::{FixedMetricSource, MetricSimulator, MetricSource, RandomMetricSource};
pub use monitor::{Monitor, MonitorBuilder};
pub use notify::{Dispatcher, Notification, Notifier, Permission, Preferences};
pub use reminder::ReminderScheduler;
pub use runtime::{MonitorRuntime, VirtualClock};
pub use session::{Achievement, AchievementId, SessionRecord, SessionTracker};
pub use storage::{Config, Database, MemoryStore, SessionStore};
pub use timer::{TimerKind, TimerSet};
