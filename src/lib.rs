// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # synfit - dynamic-topology synapse circuit fitting
//!
//! Fits the free parameters of a simulated circuit (synapse count, peak
//! conductance, time constants) so that simulated traces match target
//! electrophysiological features. Every candidate gets a freshly built
//! circuit: the number of synapses is itself a parameter, so the object graph
//! is instantiated, simulated, scored and destroyed per evaluation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use synfit::prelude::*;
//! # fn build_model() -> CircuitModel { unimplemented!() }
//! # fn build_objectives() -> ObjectivesCalculator { unimplemented!() }
//! # fn soma() -> CompLocation { unimplemented!() }
//!
//! let config = synfit::config::load_config(None, None)?;
//! let protocol = SweepProtocol::new("step", vec![CompRecording::voltage("soma.v", soma())], 65.0);
//!
//! let mut evaluator = CellEvaluator::new(
//!     build_model(),
//!     Box::new(StdSimulator::new()),
//!     vec![Box::new(protocol)],
//!     build_objectives(),
//! )?
//! .with_config(config.simulation.clone(), config.evaluation.clone());
//!
//! let evaluation = evaluator.evaluate_with_lists(&[15.0, 0.001])?;
//! println!("fitness: {}", evaluator.fitness_value(&evaluation));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: synfit-config, synfit-observability        │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Simulator: synfit-sim-neural, synfit-sim-runtime       │
//! │  (handles, locations, mechanisms, Simulator context)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Lifecycle: synfit-circuit                              │
//! │  (parameters, entity groups, spike sources, model)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Evaluation: synfit-evolutionary                        │
//! │  (protocols, features, objectives, evaluator)           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use synfit_config as config;
pub use synfit_observability as observability;

// Re-export simulator subsystem
pub use synfit_sim_neural as neural;
pub use synfit_sim_runtime as runtime;

// Re-export lifecycle and evaluation layers
pub use synfit_circuit as circuit;
pub use synfit_evolutionary as evolutionary;

/// Logging settings for `observability::init_logging` taken from the
/// `[logging]` section of the configuration file
pub fn logging_config(config: &config::SynfitConfig) -> observability::LoggingConfig {
    let format = match config.logging.format {
        config::LogFormat::Text => observability::LogFormat::Text,
        config::LogFormat::Json => observability::LogFormat::Json,
    };
    observability::LoggingConfig {
        level: config.logging.level.clone(),
        format,
        ..observability::LoggingConfig::default()
    }
}

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::circuit::{
        BindingTarget, CircuitError, CircuitModel, Destroyable, DistributedMechanism,
        EntityGroup, FixedIntervals, Instantiable, IntervalGenerator, ParameterSpec,
        ParameterValues, PoissonIntervals, SequenceIntervals, SpikeEventSource,
    };
    pub use crate::config::SynfitConfig;
    pub use crate::evolutionary::{
        CellEvaluator, CompRecording, EFeature, Evaluation, EvoError, FeatureKind, Fitness,
        ObjectivesCalculator, Protocol, SingletonObjective, SweepProtocol,
    };
    pub use crate::neural::{CompLocation, Morphology, Responses, SeclistLocation};
    pub use crate::runtime::{Simulator, StdSimulator};
}
