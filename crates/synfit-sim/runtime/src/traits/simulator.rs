// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulator context abstraction
//!
//! The lifecycle layer never inspects simulator-native state. Everything it
//! allocates goes through a `Simulator` and comes back as an opaque handle, and
//! every handle it holds must eventually be handed back for release.
//!
//! ## Design Philosophy
//!
//! - **Opaque handles**: cells, mechanisms, point processes and connections are
//!   plain ids owned by the backend
//! - **Explicit release**: nothing is freed implicitly; `live_handles()` exposes
//!   what is still allocated so leaks are observable
//! - **Object safe**: callers hold `&mut dyn Simulator`

use synfit_sim_neural::{
    CellHandle, CompLocation, ConnectionHandle, MechanismHandle, Morphology, PointProcessHandle,
    Responses, SeclistLocation, SimError, SimResult,
};

/// One recorded variable
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingRequest {
    /// Key of the trace in the returned `Responses`
    pub name: String,
    pub location: CompLocation,
    /// Recorded variable; `v` is the only variable every backend must support
    pub variable: String,
}

impl RecordingRequest {
    pub fn voltage(name: impl Into<String>, location: CompLocation) -> Self {
        Self {
            name: name.into(),
            location,
            variable: "v".to_string(),
        }
    }
}

/// Parameters of one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Simulated duration (ms)
    pub tstop: f64,
    /// Integration step (ms)
    pub dt: f64,
    /// Initial membrane potential of every section (mV)
    pub v_init: f64,
    /// Temperature (°C), forwarded to temperature-dependent mechanisms
    pub celsius: f64,
    pub recordings: Vec<RecordingRequest>,
}

impl RunRequest {
    /// Check the numeric fields
    pub fn validate(&self) -> SimResult<()> {
        if !self.tstop.is_finite() || self.tstop <= 0.0 {
            return Err(SimError::InvalidRunRequest(format!(
                "tstop must be finite and > 0, got {}",
                self.tstop
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 || self.dt > self.tstop {
            return Err(SimError::InvalidRunRequest(format!(
                "dt must be finite and within (0, tstop], got {}",
                self.dt
            )));
        }
        if !self.v_init.is_finite() {
            return Err(SimError::InvalidRunRequest(
                "v_init must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of integration steps covering `[0, tstop]`
    pub fn step_count(&self) -> usize {
        (self.tstop / self.dt).round().max(1.0) as usize
    }
}

/// Counts of simulator-native objects that are currently allocated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveHandles {
    pub cells: usize,
    pub mechanisms: usize,
    pub point_processes: usize,
    pub connections: usize,
}

impl LiveHandles {
    pub fn total(&self) -> usize {
        self.cells + self.mechanisms + self.point_processes + self.connections
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Simulator context: allocates and releases simulator-native state
///
/// # Example
///
/// ```ignore
/// let mut sim = StdSimulator::new();
/// let cell = sim.create_cell(&morphology)?;
/// let syn = sim.create_point_process(cell, &location, "ExpSyn")?;
/// let conn = sim.connect(syn, 1.0)?;
/// sim.schedule_event(conn, 20.0)?;
/// let responses = sim.run(cell, &request)?;
/// ```
pub trait Simulator: Send {
    /// Instantiate a cell from a morphology
    fn create_cell(&mut self, morphology: &Morphology) -> SimResult<CellHandle>;

    /// Release a cell
    ///
    /// Objects still attached to the cell stay allocated (and counted by
    /// `live_handles`) until they are released themselves.
    fn destroy_cell(&mut self, cell: CellHandle) -> SimResult<()>;

    /// Insert a distributed mechanism on every section of a section list
    fn insert_mechanism(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        suffix: &str,
    ) -> SimResult<MechanismHandle>;

    fn remove_mechanism(&mut self, mechanism: MechanismHandle) -> SimResult<()>;

    /// Set a section or range-variable attribute (`cm`, `g_pas`, ...) on a section list
    fn set_section_attribute(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        attribute: &str,
        value: f64,
    ) -> SimResult<()>;

    /// Allocate a point process of mechanism `suffix` at a compartment
    fn create_point_process(
        &mut self,
        cell: CellHandle,
        location: &CompLocation,
        suffix: &str,
    ) -> SimResult<PointProcessHandle>;

    fn set_point_process_attribute(
        &mut self,
        point_process: PointProcessHandle,
        attribute: &str,
        value: f64,
    ) -> SimResult<()>;

    fn point_process_attribute(
        &self,
        point_process: PointProcessHandle,
        attribute: &str,
    ) -> SimResult<f64>;

    fn destroy_point_process(&mut self, point_process: PointProcessHandle) -> SimResult<()>;

    /// Create an event connection targeting a point process
    fn connect(&mut self, target: PointProcessHandle, weight: f64) -> SimResult<ConnectionHandle>;

    /// Schedule one event (ms) on a connection; events replay on every run
    fn schedule_event(&mut self, connection: ConnectionHandle, time: f64) -> SimResult<()>;

    /// Release a connection together with its scheduled events
    fn disconnect(&mut self, connection: ConnectionHandle) -> SimResult<()>;

    /// Run one simulation of `cell` and return the requested recordings
    fn run(&mut self, cell: CellHandle, request: &RunRequest) -> SimResult<Responses>;

    /// Currently allocated native objects
    fn live_handles(&self) -> LiveHandles;

    /// Backend name for logging/debugging
    fn name(&self) -> &'static str {
        "Generic Simulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tstop: f64, dt: f64) -> RunRequest {
        RunRequest {
            tstop,
            dt,
            v_init: -65.0,
            celsius: 34.0,
            recordings: Vec::new(),
        }
    }

    #[test]
    fn test_run_request_validation() {
        assert!(request(100.0, 0.025).validate().is_ok());
        assert!(request(0.0, 0.025).validate().is_err());
        assert!(request(100.0, 0.0).validate().is_err());
        assert!(request(100.0, f64::NAN).validate().is_err());
        assert!(request(1.0, 2.0).validate().is_err());
    }

    #[test]
    fn test_step_count() {
        assert_eq!(request(100.0, 0.025).step_count(), 4000);
        assert_eq!(request(1.0, 0.3).step_count(), 3);
    }

    #[test]
    fn test_live_handles_total() {
        let live = LiveHandles {
            cells: 1,
            mechanisms: 2,
            point_processes: 3,
            connections: 4,
        };
        assert_eq!(live.total(), 10);
        assert!(!live.is_empty());
        assert!(LiveHandles::default().is_empty());
    }
}
