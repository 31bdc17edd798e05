// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::Arc;

use synfit_circuit::{
    CircuitModel, DistributedMechanism, EntityGroup, FixedIntervals, ParameterSpec,
    ParameterValues, SpikeEventSource,
};
use synfit_config::{EvaluationConfig, SimulationConfig};
use synfit_evolutionary::{
    CellEvaluator, CompRecording, EFeature, EvoResult, FeatureKind, ObjectivesCalculator,
    SingletonObjective, SweepProtocol,
};
use synfit_sim_neural::{
    CellHandle, CompLocation, ConnectionHandle, MechanismHandle, Morphology, PointProcessHandle,
    Responses, SeclistLocation, SimError, SimResult,
};
use synfit_sim_runtime::{LiveHandles, RunRequest, Simulator, StdSimulator};

pub const RESPONSE: &str = "step.soma.v";

pub fn somacenter() -> CompLocation {
    CompLocation::new("somacenter", "somatic", 0, 0.5).unwrap()
}

/// Single compartment with `pas` and one `MyExpSyn` circuit driven by the
/// default interval policy (events at 20, 25, 30, 35 and 40 ms)
pub fn synapse_circuit_model() -> CircuitModel {
    let morphology = Arc::new(Morphology::single_compartment("simple", 10.0, 10.0));
    let mut model = CircuitModel::new("simple_cell", morphology);

    let somatic = SeclistLocation::new("somatic", "somatic");
    model.add_mechanism(DistributedMechanism::new("pas", "pas", vec![somatic.clone()]));

    let source = SpikeEventSource::new("netstim", FixedIntervals::default(), 65.0);
    let group = EntityGroup::new("syn_circuit", "MyExpSyn", vec![somacenter()], source)
        .unwrap()
        .with_fixed("tau", 14.0)
        .with_free("gmax");
    let group = model.add_group(group).unwrap();
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

pub fn step_protocol() -> SweepProtocol {
    SweepProtocol::new("step", vec![CompRecording::voltage("soma.v", somacenter())], 65.0)
}

pub fn max_voltage_feature() -> EFeature {
    EFeature::new(
        "maximum_voltage",
        FeatureKind::MaximumVoltage,
        RESPONSE,
        (20.0, 65.0),
        -60.0,
        2.0,
    )
    .unwrap()
}

pub fn calculator() -> ObjectivesCalculator {
    ObjectivesCalculator::new(vec![
        Box::new(SingletonObjective::new("maximum_voltage", max_voltage_feature())),
        Box::new(SingletonObjective::new(
            "voltage_base",
            EFeature::new(
                "voltage_base",
                FeatureKind::VoltageBase,
                RESPONSE,
                (20.0, 65.0),
                -70.0,
                1.0,
            )
            .unwrap(),
        )),
    ])
}

pub fn evaluator_with(sim: Box<dyn Simulator>, keep_responses: bool) -> EvoResult<CellEvaluator> {
    Ok(CellEvaluator::new(
        synapse_circuit_model(),
        sim,
        vec![Box::new(step_protocol())],
        calculator(),
    )?
    .with_config(
        SimulationConfig {
            dt: 0.1,
            ..SimulationConfig::default()
        },
        EvaluationConfig {
            keep_responses,
            ..EvaluationConfig::default()
        },
    ))
}

pub fn evaluator() -> CellEvaluator {
    evaluator_with(Box::new(StdSimulator::new()), true).unwrap()
}

pub fn values(nsyn: f64, gmax: f64) -> ParameterValues {
    [
        ("syn_circ_nsyn".to_string(), nsyn),
        ("syn_circ_gmax".to_string(), gmax),
    ]
    .into_iter()
    .collect()
}

/// Reference backend whose `run` always fails
pub struct FailingRunSimulator {
    inner: StdSimulator,
}

impl FailingRunSimulator {
    pub fn new() -> Self {
        Self {
            inner: StdSimulator::new(),
        }
    }
}

impl Simulator for FailingRunSimulator {
    fn create_cell(&mut self, morphology: &Morphology) -> SimResult<CellHandle> {
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
        self.inner.destroy_point_process(point_process)
    }

    fn connect(&mut self, target: PointProcessHandle, weight: f64) -> SimResult<ConnectionHandle> {
        self.inner.connect(target, weight)
    }

    fn schedule_event(&mut self, connection: ConnectionHandle, time: f64) -> SimResult<()> {
        self.inner.schedule_event(connection, time)
    }

    fn disconnect(&mut self, connection: ConnectionHandle) -> SimResult<()> {
        self.inner.disconnect(connection)
    }

    fn run(&mut self, _cell: CellHandle, _request: &RunRequest) -> SimResult<Responses> {
        Err(SimError::Backend("integration diverged".to_string()))
    }

    fn live_handles(&self) -> LiveHandles {
        self.inner.live_handles()
    }

    fn name(&self) -> &'static str {
        "Failing-Run Simulator"
    }
}
