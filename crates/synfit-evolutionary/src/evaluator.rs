// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cell Evaluator
//!
//! Scores one candidate parameter vector:
//!
//! ```text
//! Idle → Instantiating → Running → Scoring → Destroying → Idle
//! ```
//!
//! Every protocol gets its own instantiate/run/destroy cycle. Lifecycle and
//! simulator failures yield `Fitness::Invalid` rather than an error, so a bad
//! candidate is never mistaken for a poor but valid one; the circuit is
//! destroyed on every path before the result is returned.

use core::fmt;

use serde::Serialize;
use synfit_circuit::{CircuitModel, ParameterValues};
use synfit_config::{EvaluationConfig, SimulationConfig};
use synfit_sim_neural::Responses;
use synfit_sim_runtime::Simulator;
use tracing::{debug, debug_span, info_span, warn, Span};

use crate::error::{EvoError, EvoResult};
use crate::objectives::ObjectivesCalculator;
use crate::protocol::Protocol;

/// Where an evaluation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationPhase {
    Idle,
    Instantiating,
    Running,
    Scoring,
    Destroying,
}

impl fmt::Display for EvaluationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluationPhase::Idle => "idle",
            EvaluationPhase::Instantiating => "instantiating",
            EvaluationPhase::Running => "running",
            EvaluationPhase::Scoring => "scoring",
            EvaluationPhase::Destroying => "destroying",
        };
        f.write_str(name)
    }
}

/// Outcome of one evaluation; lower valid values are better
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Fitness {
    Valid(f64),
    Invalid { reason: String },
}

impl Fitness {
    pub fn is_valid(&self) -> bool {
        matches!(self, Fitness::Valid(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Fitness::Valid(value) => Some(*value),
            Fitness::Invalid { .. } => None,
        }
    }

    /// The fitness, or `penalty` for a failed evaluation
    pub fn value_or(&self, penalty: f64) -> f64 {
        self.value().unwrap_or(penalty)
    }
}

/// Result of one evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub fitness: Fitness,
    /// Per-objective scores in declaration order; empty when invalid
    pub scores: Vec<(String, f64)>,
    /// Recorded traces, when kept
    pub responses: Option<Responses>,
}

/// Runs protocols on a circuit model and scores the responses
pub struct CellEvaluator {
    model: CircuitModel,
    sim: Box<dyn Simulator>,
    protocols: Vec<Box<dyn Protocol>>,
    calculator: ObjectivesCalculator,
    simulation: SimulationConfig,
    evaluation: EvaluationConfig,
    span: Span,
    phase: EvaluationPhase,
    evaluations: u64,
}

impl fmt::Debug for CellEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellEvaluator")
            .field("model", &self.model.name())
            .field("simulator", &self.sim.name())
            .field("protocols", &self.protocols.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("calculator", &self.calculator)
            .field("phase", &self.phase)
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

impl CellEvaluator {
    /// # Errors
    ///
    /// `UnknownRecording` if a feature reads a response no protocol produces.
    pub fn new(
        model: CircuitModel,
        sim: Box<dyn Simulator>,
        protocols: Vec<Box<dyn Protocol>>,
        calculator: ObjectivesCalculator,
    ) -> EvoResult<Self> {
        let produced: Vec<String> = protocols.iter().flat_map(|p| p.response_names()).collect();
        if let Some(missing) = calculator
            .required_recordings()
            .into_iter()
            .find(|name| !produced.iter().any(|p| p == name))
        {
            return Err(EvoError::UnknownRecording(missing.to_string()));
        }

        let span = info_span!(target: "synfit-evolutionary", "evaluator", model = %model.name());
        let evaluation = EvaluationConfig::default();
        let mut calculator = calculator;
        calculator.set_max_score(evaluation.max_score);

        Ok(Self {
            model,
            sim,
            protocols,
            calculator,
            simulation: SimulationConfig::default(),
            evaluation,
            span,
            phase: EvaluationPhase::Idle,
            evaluations: 0,
        })
    }

    /// Use the given simulation and evaluation settings
    pub fn with_config(mut self, simulation: SimulationConfig, evaluation: EvaluationConfig) -> Self {
        self.calculator.set_max_score(evaluation.max_score);
        self.simulation = simulation;
        self.evaluation = evaluation;
        self
    }

    /// Parent span for every evaluation
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn model(&self) -> &CircuitModel {
        &self.model
    }

    pub fn simulator(&self) -> &dyn Simulator {
        self.sim.as_ref()
    }

    pub fn phase(&self) -> EvaluationPhase {
        self.phase
    }

    /// Evaluations started so far
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    pub fn param_names(&self) -> Vec<String> {
        self.model.free_param_names()
    }

    pub fn param_bounds(&self) -> Vec<(String, f64, f64)> {
        self.model.param_bounds()
    }

    pub fn objective_names(&self) -> Vec<String> {
        self.calculator.objective_names()
    }

    /// Map an ordered value list onto the free parameter names
    pub fn param_dict(&self, values: &[f64]) -> EvoResult<ParameterValues> {
        let names = self.param_names();
        if names.len() != values.len() {
            let missing = names.iter().skip(values.len()).cloned().collect();
            let unknown = (names.len()..values.len()).map(|i| format!("#{}", i)).collect();
            return Err(synfit_circuit::CircuitError::ParameterMismatch { missing, unknown }.into());
        }
        Ok(names.into_iter().zip(values.iter().copied()).collect())
    }

    /// Scalar for the optimizer; failed evaluations get `invalid_fitness`
    pub fn fitness_value(&self, evaluation: &Evaluation) -> f64 {
        evaluation.fitness.value_or(self.evaluation.invalid_fitness)
    }

    /// One value per objective; failed evaluations get `invalid_fitness` everywhere
    pub fn objective_values(&self, evaluation: &Evaluation) -> Vec<f64> {
        if evaluation.fitness.is_valid() {
            evaluation.scores.iter().map(|(_, score)| *score).collect()
        } else {
            vec![self.evaluation.invalid_fitness; self.calculator.objectives().len()]
        }
    }

    pub fn evaluate_with_lists(&mut self, values: &[f64]) -> EvoResult<Evaluation> {
        let values = self.param_dict(values)?;
        self.evaluate_with_dicts(&values)
    }

    /// Evaluate one candidate
    ///
    /// # Errors
    ///
    /// - `ParameterMismatch` if `values` does not name exactly the free
    ///   parameters; nothing is allocated in that case
    /// - `EvaluationInProgress` if a previous evaluation did not finish
    pub fn evaluate_with_dicts(&mut self, values: &ParameterValues) -> EvoResult<Evaluation> {
        self.ensure_idle()?;
        self.model.check_parameter_names(values)?;

        let span = self.next_span();
        let _entered = span.enter();

        let evaluation = match self.run_all(values) {
            Ok(responses) => {
                self.phase = EvaluationPhase::Scoring;
                let scores = self.calculator.calculate_scores(&responses);
                let total = scores.iter().map(|(_, score)| score).sum();
                debug!(target: "synfit-evolutionary", "Fitness {}", total);
                Evaluation {
                    fitness: Fitness::Valid(total),
                    scores,
                    responses: self.evaluation.keep_responses.then_some(responses),
                }
            }
            Err(e) => {
                warn!(target: "synfit-evolutionary", "Evaluation failed: {}", e);
                Evaluation {
                    fitness: Fitness::Invalid {
                        reason: e.to_string(),
                    },
                    scores: Vec::new(),
                    responses: None,
                }
            }
        };

        self.phase = EvaluationPhase::Idle;
        self.check_released();
        Ok(evaluation)
    }

    /// Run every protocol and return the traces, surfacing failures as errors
    pub fn run_protocols(&mut self, values: &ParameterValues) -> EvoResult<Responses> {
        self.ensure_idle()?;
        self.model.check_parameter_names(values)?;

        let span = self.next_span();
        let _entered = span.enter();

        let result = self.run_all(values);
        self.phase = EvaluationPhase::Idle;
        self.check_released();
        result
    }

    fn ensure_idle(&self) -> EvoResult<()> {
        if self.phase != EvaluationPhase::Idle || self.model.is_instantiated() {
            return Err(EvoError::EvaluationInProgress(self.phase.to_string()));
        }
        Ok(())
    }

    fn next_span(&mut self) -> Span {
        let index = self.evaluations;
        self.evaluations += 1;
        debug_span!(target: "synfit-evolutionary", parent: &self.span, "evaluation", index)
    }

    fn run_all(&mut self, values: &ParameterValues) -> EvoResult<Responses> {
        self.phase = EvaluationPhase::Instantiating;
        let mut result = self.model.freeze(values).map_err(EvoError::from);

        let mut responses = Responses::new();
        if result.is_ok() {
            for protocol in &self.protocols {
                match run_protocol(
                    protocol.as_ref(),
                    &mut self.model,
                    self.sim.as_mut(),
                    &self.simulation,
                    &mut self.phase,
                ) {
                    Ok(traces) => responses.extend(traces),
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                }
            }
        }

        self.model.unfreeze(values.keys());
        result.map(|()| responses)
    }

    fn check_released(&self) {
        let live = self.sim.live_handles();
        if !live.is_empty() {
            warn!(
                target: "synfit-evolutionary",
                "{} simulator objects still allocated after evaluation: {:?}",
                live.total(),
                live
            );
        }
    }
}

fn run_protocol(
    protocol: &dyn Protocol,
    model: &mut CircuitModel,
    sim: &mut dyn Simulator,
    settings: &SimulationConfig,
    phase: &mut EvaluationPhase,
) -> EvoResult<Responses> {
    *phase = EvaluationPhase::Instantiating;
    let mut circuit = model.instantiate_scoped(sim)?;

    *phase = EvaluationPhase::Running;
    let responses = protocol.run_instantiated(&mut circuit, settings);

    *phase = EvaluationPhase::Destroying;
    match responses {
        Ok(responses) => {
            circuit.release()?;
            Ok(responses)
        }
        Err(e) => {
            // Dropping the guard destroys the circuit and logs any failure
            drop(circuit);
            Err(e)
        }
    }
}
