use serde::{Deserialize, Serialize};

use super::source::MetricSource;
use crate::session::MAX_EYE_STRAIN;

/// Seconds of continuous screen time per eye strain point.
const STRAIN_SECONDS_PER_LEVEL: u64 = 600;
/// Rates below this add the low-rate strain penalty.
const LOW_RATE_STRAIN_THRESHOLD: u32 = 15;
const LOW_RATE_STRAIN_PENALTY: u64 = 2;

/// Owns the shared blink-rate value. It is the only writer of that value;
/// everything else reads it through [`MetricSimulator::blink_rate`].
pub struct MetricSimulator {
    source: Box<dyn MetricSource>,
    blink_rate: u32,
}

impl MetricSimulator {
    pub fn new(source: Box<dyn MetricSource>) -> Self {
        let blink_rate = source.initial_blink_rate();
        Self { source, blink_rate }
    }

    pub fn blink_rate(&self) -> u32 {
        self.blink_rate
    }

    /// Blink window elapsed: did the user blink?
    pub fn sample_blink(&mut self) -> bool {
        self.source.sample_blink()
    }

    /// Rate window elapsed: take and store a new rate.
    pub fn sample_rate(&mut self) -> u32 {
        self.blink_rate = self.source.sample_blink_rate();
        tracing::debug!(rate = self.blink_rate, "blink rate sampled");
        self.blink_rate
    }
}

impl std::fmt::Debug for MetricSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSimulator")
            .field("blink_rate", &self.blink_rate)
            .finish_non_exhaustive()
    }
}

/// `min(10, floor(duration / 600) + (2 if rate < 15))`.
pub fn eye_strain_level(session_duration_secs: u64, blink_rate: u32) -> u8 {
    let penalty = if blink_rate < LOW_RATE_STRAIN_THRESHOLD {
        LOW_RATE_STRAIN_PENALTY
    } else {
        0
    };
    let level = session_duration_secs / STRAIN_SECONDS_PER_LEVEL + penalty;
    level.min(u64::from(MAX_EYE_STRAIN)) as u8
}

/// Health band of a blinks-per-minute reading. Normal is 15 to 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlinkRateHealth {
    Low,
    Healthy,
    High,
}

impl BlinkRateHealth {
    pub fn classify(rate: u32) -> Self {
        match rate {
            0..=14 => Self::Low,
            15..=20 => Self::Healthy,
            _ => Self::High,
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Self::Low => "Blink more frequently to prevent dry eyes.",
            Self::Healthy => "Your blink rate is healthy! Keep it up.",
            Self::High => "You're blinking too frequently.",
        }
    }
}
