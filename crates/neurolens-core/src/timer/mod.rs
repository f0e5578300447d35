mod periodic;
mod set;

pub use periodic::{PeriodicTimer, Throttle};
pub use set::{TimerIntervals, TimerKind, TimerSet};
