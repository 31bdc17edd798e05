// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for candidate evaluation.
*/

use synfit_circuit::CircuitError;
use synfit_sim_neural::SimError;

/// Result type for evaluation operations
pub type EvoResult<T> = Result<T, EvoError>;

/// Errors raised while configuring or running an evaluation
#[derive(Debug, thiserror::Error)]
pub enum EvoError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    Simulator(#[from] SimError),

    #[error("no protocol records '{0}'")]
    UnknownRecording(String),

    #[error("response '{0}' is missing from the simulation output")]
    MissingResponse(String),

    #[error("invalid objective: {0}")]
    InvalidObjective(String),

    #[error("evaluator is not idle (phase: {0})")]
    EvaluationInProgress(String),

    #[error("worker pool failure: {0}")]
    Worker(String),
}
