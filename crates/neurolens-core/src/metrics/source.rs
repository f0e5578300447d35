//! Pluggable metric sources.
//!
//! A source answers two questions for the simulator: "did the user blink
//! in this sampling window?" and "what is the current blink rate?". The
//! random source stands in for a camera pipeline; the fixed source pins the
//! rate for scripted runs and tests.

use std::ops::RangeInclusive;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// Blink rate assumed before the first sample arrives.
pub const DEFAULT_BLINK_RATE: u32 = 17;

pub trait MetricSource: Send {
    /// Rate reported before the first rate sample.
    fn initial_blink_rate(&self) -> u32 {
        DEFAULT_BLINK_RATE
    }

    /// Whether a blink occurred in the current blink window.
    fn sample_blink(&mut self) -> bool;

    /// A fresh blinks-per-minute reading.
    fn sample_blink_rate(&mut self) -> u32;
}

/// Uniform random stand-in for real detection.
#[derive(Debug, Clone)]
pub struct RandomMetricSource {
    rng: Mcg128Xsl64,
    blink_probability: f64,
    rate_range: RangeInclusive<u32>,
}

impl RandomMetricSource {
    /// `seed = None` draws a seed from the OS.
    pub fn new(blink_probability: f64, rate_range: RangeInclusive<u32>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => Mcg128Xsl64::seed_from_u64(s),
            None => Mcg128Xsl64::from_entropy(),
        };
        let (lo, hi) = rate_range.into_inner();
        Self {
            rng,
            blink_probability: blink_probability.clamp(0.0, 1.0),
            rate_range: lo.min(hi)..=lo.max(hi),
        }
    }
}

impl Default for RandomMetricSource {
    fn default() -> Self {
        Self::new(0.3, 13..=22, None)
    }
}

impl MetricSource for RandomMetricSource {
    fn sample_blink(&mut self) -> bool {
        self.rng.gen_bool(self.blink_probability)
    }

    fn sample_blink_rate(&mut self) -> u32 {
        self.rng.gen_range(self.rate_range.clone())
    }
}

/// Always reports the same rate. Blinks follow a fixed yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMetricSource {
    rate: u32,
    blinks: bool,
}

impl FixedMetricSource {
    pub fn new(rate: u32) -> Self {
        Self { rate, blinks: true }
    }

    pub fn without_blinks(rate: u32) -> Self {
        Self { rate, blinks: false }
    }
}

impl MetricSource for FixedMetricSource {
    fn initial_blink_rate(&self) -> u32 {
        self.rate
    }

    fn sample_blink(&mut self) -> bool {
        self.blinks
    }

    fn sample_blink_rate(&mut self) -> u32 {
        self.rate
    }
}
