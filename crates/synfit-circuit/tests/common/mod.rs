// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::Arc;

use synfit_circuit::{
    CircuitModel, DistributedMechanism, EntityGroup, FixedIntervals, ParameterSpec,
    ParameterValues, SpikeEventSource,
};
use synfit_sim_neural::{
    CellHandle, CompLocation, ConnectionHandle, MechanismHandle, Morphology, PointProcessHandle,
    Responses, SeclistLocation, SimError, SimResult,
};
use synfit_sim_runtime::{LiveHandles, RunRequest, Simulator, StdSimulator};

/// Reference backend with injectable failures and an allocation counter
pub struct FaultySimulator {
    inner: StdSimulator,
    /// Fail the k-th (0-based) point-process allocation
    pub fail_point_process_at: Option<usize>,
    /// Fail releasing the k-th (0-based) point-process release request
    pub fail_point_process_release_at: Option<usize>,
    /// Native allocations requested (cells, mechanisms, point processes, connections)
    pub allocations: usize,
    point_process_requests: usize,
    point_process_releases: usize,
}

impl FaultySimulator {
    pub fn new() -> Self {
        Self {
            inner: StdSimulator::new(),
            fail_point_process_at: None,
            fail_point_process_release_at: None,
            allocations: 0,
            point_process_requests: 0,
            point_process_releases: 0,
        }
    }

    pub fn failing_point_process_at(k: usize) -> Self {
        Self {
            fail_point_process_at: Some(k),
            ..Self::new()
        }
    }
}

impl Simulator for FaultySimulator {
    fn create_cell(&mut self, morphology: &Morphology) -> SimResult<CellHandle> {
        self.allocations += 1;
        self.inner.create_cell(morphology)
    }

    fn destroy_cell(&mut self, cell: CellHandle) -> SimResult<()> {
        self.inner.destroy_cell(cell)
    }

    fn insert_mechanism(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        suffix: &str,
    ) -> SimResult<MechanismHandle> {
        self.allocations += 1;
        self.inner.insert_mechanism(cell, location, suffix)
    }

    fn remove_mechanism(&mut self, mechanism: MechanismHandle) -> SimResult<()> {
        self.inner.remove_mechanism(mechanism)
    }

    fn set_section_attribute(
        &mut self,
        cell: CellHandle,
        location: &SeclistLocation,
        attribute: &str,
        value: f64,
    ) -> SimResult<()> {
        self.inner.set_section_attribute(cell, location, attribute, value)
    }

    fn create_point_process(
        &mut self,
        cell: CellHandle,
        location: &CompLocation,
        suffix: &str,
    ) -> SimResult<PointProcessHandle> {
        let request = self.point_process_requests;
        self.point_process_requests += 1;
        if self.fail_point_process_at == Some(request) {
            return Err(SimError::Backend(format!(
                "injected failure at point process #{}",
                request
            )));
        }
        self.allocations += 1;
        self.inner.create_point_process(cell, location, suffix)
    }

    fn set_point_process_attribute(
        &mut self,
        point_process: PointProcessHandle,
        attribute: &str,
        value: f64,
    ) -> SimResult<()> {
        self.inner
            .set_point_process_attribute(point_process, attribute, value)
    }

    fn point_process_attribute(
        &self,
        point_process: PointProcessHandle,
        attribute: &str,
    ) -> SimResult<f64> {
        self.inner.point_process_attribute(point_process, attribute)
    }

    fn destroy_point_process(&mut self, point_process: PointProcessHandle) -> SimResult<()> {
        let request = self.point_process_releases;
        self.point_process_releases += 1;
        if self.fail_point_process_release_at == Some(request) {
            return Err(SimError::Backend(format!(
                "injected release failure at point process #{}",
                request
            )));
        }
        self.inner.destroy_point_process(point_process)
    }

    fn connect(&mut self, target: PointProcessHandle, weight: f64) -> SimResult<ConnectionHandle> {
        self.allocations += 1;
        self.inner.connect(target, weight)
    }

    fn schedule_event(&mut self, connection: ConnectionHandle, time: f64) -> SimResult<()> {
        self.inner.schedule_event(connection, time)
    }

    fn disconnect(&mut self, connection: ConnectionHandle) -> SimResult<()> {
        self.inner.disconnect(connection)
    }

    fn run(&mut self, cell: CellHandle, request: &RunRequest) -> SimResult<Responses> {
        self.inner.run(cell, request)
    }

    fn live_handles(&self) -> LiveHandles {
        self.inner.live_handles()
    }

    fn name(&self) -> &'static str {
        "Faulty Simulator"
    }
}

pub fn somacenter() -> CompLocation {
    CompLocation::new("somacenter", "somatic", 0, 0.5).unwrap()
}

/// Group of `MyExpSyn` at the soma center, fixed `tau = 14`, free `gmax`
pub fn synapse_group(source: SpikeEventSource) -> EntityGroup {
    EntityGroup::new("syn_circuit", "MyExpSyn", vec![somacenter()], source)
        .unwrap()
        .with_fixed("tau", 14.0)
        .with_free("gmax")
}

/// Single-compartment cell with `pas`, a frozen `cm` and one synapse circuit
/// addressed by `syn_circ_nsyn` and `syn_circ_gmax`
pub fn synapse_circuit_model() -> CircuitModel {
    let morphology = Arc::new(Morphology::single_compartment("simple", 10.0, 10.0));
    let mut model = CircuitModel::new("simple_cell", morphology);

    let somatic = SeclistLocation::new("somatic", "somatic");
    model.add_mechanism(DistributedMechanism::new("pas", "pas", vec![somatic.clone()]));

    let source = SpikeEventSource::new("netstim", FixedIntervals::default(), 65.0);
    let group = model.add_group(synapse_group(source)).unwrap();
    let soma = model.add_section_list(somatic);

    model
        .add_parameter(ParameterSpec::frozen("cm", 1.0), "cm", vec![soma])
        .unwrap();
    model
        .add_parameter(
            ParameterSpec::free("syn_circ_nsyn", 0.0, 100.0).unwrap(),
            "n",
            vec![group],
        )
        .unwrap();
    model
        .add_parameter(
            ParameterSpec::free("syn_circ_gmax", 0.0, 0.01).unwrap(),
            "gmax",
            vec![group],
        )
        .unwrap();
    model
}

pub fn values(nsyn: f64, gmax: f64) -> ParameterValues {
    [
        ("syn_circ_nsyn".to_string(), nsyn),
        ("syn_circ_gmax".to_string(), gmax),
    ]
    .into_iter()
    .collect()
}
