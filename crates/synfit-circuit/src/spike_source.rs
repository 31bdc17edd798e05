// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spike Event Source
//!
//! Turns an interval generator into absolute event times and drives one
//! connection per destination.
//!
//! ```text
//! t = 0
//! loop:
//!     gap = generator.next_interval()    (None, non-finite or negative → stop)
//!     t += gap
//!     t > total_duration                 → stop
//!     emit t
//! ```
//!
//! Destinations are supplied by the owning group right before `instantiate`
//! and are dropped again on `destroy`.

use synfit_sim_neural::{CellHandle, ConnectionHandle, PointProcessHandle};
use synfit_sim_runtime::Simulator;
use tracing::debug;

use crate::error::{CircuitResult, CleanupErrors};
use crate::interval::IntervalGenerator;
use crate::lifecycle::{Destroyable, Instantiable};

/// Event source wired to a set of point processes
pub struct SpikeEventSource {
    name: String,
    generator: Box<dyn IntervalGenerator>,
    total_duration: f64,
    weight: f64,
    destinations: Vec<PointProcessHandle>,
    connections: Vec<ConnectionHandle>,
}

impl core::fmt::Debug for SpikeEventSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpikeEventSource")
            .field("name", &self.name)
            .field("total_duration", &self.total_duration)
            .field("weight", &self.weight)
            .field("destinations", &self.destinations)
            .field("connections", &self.connections)
            .finish()
    }
}

impl SpikeEventSource {
    pub fn new(
        name: impl Into<String>,
        generator: impl IntervalGenerator + 'static,
        total_duration: f64,
    ) -> Self {
        Self {
            name: name.into(),
            generator: Box::new(generator),
            total_duration,
            weight: 1.0,
            destinations: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Connection weight applied to every destination
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn destinations(&self) -> &[PointProcessHandle] {
        &self.destinations
    }

    pub fn connections(&self) -> &[ConnectionHandle] {
        &self.connections
    }

    /// Replace the destination list
    pub fn set_destinations(&mut self, destinations: Vec<PointProcessHandle>) {
        self.destinations = destinations;
    }

    /// Rewind the interval generator
    pub fn reset(&mut self) {
        self.generator.reset();
    }

    /// Event times of one full pass, starting from a freshly reset generator
    pub fn spike_times(&mut self) -> SpikeTimes<'_> {
        self.generator.reset();
        SpikeTimes {
            generator: self.generator.as_mut(),
            total_duration: self.total_duration,
            t: 0.0,
            done: false,
        }
    }

    /// Connect every destination and schedule every event time on it
    pub fn connect(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        if !self.connections.is_empty() {
            self.disconnect(sim)?;
        }
        let times: Vec<f64> = self.spike_times().collect();

        for &destination in &self.destinations {
            let connection = sim.connect(destination, self.weight)?;
            self.connections.push(connection);
            for &t in &times {
                sim.schedule_event(connection, t)?;
            }
        }
        debug!(
            target: "synfit-circuit",
            "Source '{}' scheduled {} events on {} destinations",
            self.name,
            times.len(),
            self.destinations.len()
        );
        Ok(())
    }

    /// Release every connection; the first failure is returned
    pub fn disconnect(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let mut errors = CleanupErrors::new();
        for connection in self.connections.drain(..) {
            if let Err(e) = sim.disconnect(connection) {
                errors.record(&connection.to_string(), e);
            }
        }
        errors.into_result()
    }
}

impl Instantiable for SpikeEventSource {
    fn instantiate(&mut self, sim: &mut dyn Simulator, _cell: CellHandle) -> CircuitResult<()> {
        self.connect(sim)
    }
}

impl Destroyable for SpikeEventSource {
    fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let result = self.disconnect(sim);
        self.destinations.clear();
        result
    }
}

/// Lazy iterator over the event times of one pass
pub struct SpikeTimes<'a> {
    generator: &'a mut dyn IntervalGenerator,
    total_duration: f64,
    t: f64,
    done: bool,
}

impl Iterator for SpikeTimes<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.done {
            return None;
        }
        let next = self
            .generator
            .next_interval()
            .filter(|gap| gap.is_finite() && *gap >= 0.0)
            .map(|gap| self.t + gap)
            .filter(|t| *t <= self.total_duration);
        match next {
            Some(t) => {
                self.t = t;
                Some(t)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
