//! Simulated blink and eye-strain metrics.

mod simulator;
mod source;

pub use simulator::{eye_strain_level, BlinkRateHealth, MetricSimulator};
pub use source::{FixedMetricSource, MetricSource, RandomMetricSource, DEFAULT_BLINK_RATE};
