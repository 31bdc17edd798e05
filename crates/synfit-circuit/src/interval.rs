// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Interval Generators
//!
//! Stateful inter-event-interval (ISI) sources. A generator yields successive
//! gaps in ms until it signals the end of its sequence with `None`; `reset`
//! rewinds it so the next pass yields the identical sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CircuitError, CircuitResult};

/// Inter-event-interval source
pub trait IntervalGenerator: Send {
    /// Next gap (ms), or `None` once the sequence is exhausted
    fn next_interval(&mut self) -> Option<f64>;

    /// Rewind to the initial state; safe to call any number of times
    fn reset(&mut self);
}

/// Onset interval followed by a constant interval, for a fixed number of events
#[derive(Debug, Clone, PartialEq)]
pub struct FixedIntervals {
    first: f64,
    subsequent: f64,
    count: usize,
    emitted: usize,
}

impl FixedIntervals {
    pub fn new(first: f64, subsequent: f64, count: usize) -> Self {
        Self {
            first,
            subsequent,
            count,
            emitted: 0,
        }
    }
}

impl Default for FixedIntervals {
    /// 20 ms onset, then 5 ms, 5 events
    fn default() -> Self {
        Self::new(20.0, 5.0, 5)
    }
}

impl IntervalGenerator for FixedIntervals {
    fn next_interval(&mut self) -> Option<f64> {
        if self.emitted >= self.count {
            return None;
        }
        self.emitted += 1;
        if self.emitted == 1 {
            Some(self.first)
        } else {
            Some(self.subsequent)
        }
    }

    fn reset(&mut self) {
        self.emitted = 0;
    }
}

/// Explicit list of intervals
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceIntervals {
    intervals: Vec<f64>,
    position: usize,
}

impl SequenceIntervals {
    pub fn new(intervals: Vec<f64>) -> Self {
        Self {
            intervals,
            position: 0,
        }
    }
}

impl IntervalGenerator for SequenceIntervals {
    fn next_interval(&mut self) -> Option<f64> {
        let interval = self.intervals.get(self.position).copied()?;
        self.position += 1;
        Some(interval)
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

/// Exponentially distributed intervals from a seeded generator
///
/// The first interval is `onset` plus one exponential draw. `reset` reseeds,
/// so every pass reproduces the same stream.
#[derive(Debug, Clone)]
pub struct PoissonIntervals {
    rate_hz: f64,
    onset: f64,
    max_events: Option<usize>,
    seed: u64,
    rng: StdRng,
    emitted: usize,
}

impl PoissonIntervals {
    pub fn new(rate_hz: f64, seed: u64) -> CircuitResult<Self> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(CircuitError::InvalidConfiguration(format!(
                "Poisson rate must be finite and > 0, got {}",
                rate_hz
            )));
        }
        Ok(Self {
            rate_hz,
            onset: 0.0,
            max_events: None,
            seed,
            rng: StdRng::seed_from_u64(seed),
            emitted: 0,
        })
    }

    pub fn with_onset(mut self, onset: f64) -> Self {
        self.onset = onset;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }
}

impl IntervalGenerator for PoissonIntervals {
    fn next_interval(&mut self) -> Option<f64> {
        if self.max_events.is_some_and(|max| self.emitted >= max) {
            return None;
        }
        // 1 - u lies in (0, 1], so the log is finite
        let u: f64 = self.rng.gen();
        let gap = -(1.0 - u).ln() * 1000.0 / self.rate_hz;
        self.emitted += 1;
        if self.emitted == 1 {
            Some(self.onset + gap)
        } else {
            Some(gap)
        }
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.emitted = 0;
    }
}
