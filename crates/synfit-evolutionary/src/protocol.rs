// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Protocols
//!
//! A protocol is one simulation of a live circuit: how long to run and what to
//! record. Recording names in the returned `Responses` are qualified by the
//! protocol name (`<protocol>.<recording>`), so several protocols can feed one
//! objective set.

use synfit_circuit::{CircuitModel, InstantiatedCircuit, ParameterValues};
use synfit_config::SimulationConfig;
use synfit_sim_neural::{CompLocation, Responses};
use synfit_sim_runtime::{RecordingRequest, RunRequest, Simulator};
use tracing::debug;

use crate::error::{EvoError, EvoResult};

/// A variable recorded at one compartment
#[derive(Debug, Clone, PartialEq)]
pub struct CompRecording {
    pub name: String,
    pub location: CompLocation,
    pub variable: String,
}

impl CompRecording {
    /// Membrane potential at `location`
    pub fn voltage(name: impl Into<String>, location: CompLocation) -> Self {
        Self {
            name: name.into(),
            location,
            variable: "v".to_string(),
        }
    }
}

/// A simulation run against an instantiated circuit
pub trait Protocol: Send {
    fn name(&self) -> &str;

    /// Fully qualified names of the traces this protocol returns
    fn response_names(&self) -> Vec<String>;

    /// Run against a circuit that is already live
    fn run_instantiated(
        &self,
        circuit: &mut InstantiatedCircuit<'_>,
        settings: &SimulationConfig,
    ) -> EvoResult<Responses>;

    /// Freeze `values`, instantiate, run, destroy and unfreeze
    ///
    /// The circuit is destroyed on every exit path and `values` are cleared
    /// from the model again before returning.
    fn run(
        &self,
        model: &mut CircuitModel,
        values: &ParameterValues,
        sim: &mut dyn Simulator,
        settings: &SimulationConfig,
    ) -> EvoResult<Responses> {
        let result = match model.freeze(values) {
            Ok(()) => run_scoped(self, model, sim, settings),
            Err(e) => Err(e.into()),
        };
        model.unfreeze(values.keys());
        result
    }
}

fn run_scoped<P: Protocol + ?Sized>(
    protocol: &P,
    model: &mut CircuitModel,
    sim: &mut dyn Simulator,
    settings: &SimulationConfig,
) -> EvoResult<Responses> {
    let mut circuit = model.instantiate_scoped(sim)?;
    let responses = protocol.run_instantiated(&mut circuit, settings)?;
    circuit.release()?;
    Ok(responses)
}

/// A single run of fixed duration with a set of recordings
#[derive(Debug, Clone)]
pub struct SweepProtocol {
    name: String,
    recordings: Vec<CompRecording>,
    total_duration: f64,
}

impl SweepProtocol {
    pub fn new(name: impl Into<String>, recordings: Vec<CompRecording>, total_duration: f64) -> Self {
        Self {
            name: name.into(),
            recordings,
            total_duration,
        }
    }

    pub fn recordings(&self) -> &[CompRecording] {
        &self.recordings
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    fn response_name(&self, recording: &CompRecording) -> String {
        format!("{}.{}", self.name, recording.name)
    }

    fn run_request(&self, settings: &SimulationConfig) -> RunRequest {
        RunRequest {
            tstop: self.total_duration,
            dt: settings.dt,
            v_init: settings.v_init,
            celsius: settings.celsius,
            recordings: self
                .recordings
                .iter()
                .map(|recording| RecordingRequest {
                    name: self.response_name(recording),
                    location: recording.location.clone(),
                    variable: recording.variable.clone(),
                })
                .collect(),
        }
    }
}

impl Protocol for SweepProtocol {
    fn name(&self) -> &str {
        &self.name
    }

    fn response_names(&self) -> Vec<String> {
        self.recordings
            .iter()
            .map(|recording| self.response_name(recording))
            .collect()
    }

    fn run_instantiated(
        &self,
        circuit: &mut InstantiatedCircuit<'_>,
        settings: &SimulationConfig,
    ) -> EvoResult<Responses> {
        let request = self.run_request(settings);
        let responses = circuit.run(&request)?;

        for name in self.response_names() {
            if !responses.contains_key(&name) {
                return Err(EvoError::MissingResponse(name));
            }
        }
        debug!(
            target: "synfit-evolutionary",
            "Protocol '{}' ran {} ms on {}",
            self.name,
            self.total_duration,
            circuit.cell()
        );
        Ok(responses)
    }
}
