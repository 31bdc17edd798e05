// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for circuit lifecycle operations.
*/

use synfit_sim_neural::SimError;

/// Result type for circuit operations
pub type CircuitResult<T> = Result<T, CircuitError>;

/// Errors raised while configuring, instantiating or destroying a circuit
#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("parameter '{0}' has no value and cannot be instantiated")]
    MissingValue(String),

    #[error("parameter names do not match the model: missing {missing:?}, unknown {unknown:?}")]
    ParameterMismatch {
        missing: Vec<String>,
        unknown: Vec<String>,
    },

    #[error("parameter '{name}' value {value} is outside bounds [{lower}, {upper}]")]
    ParameterOutOfBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("parameter '{name}' is frozen at {value}")]
    FrozenParameter { name: String, value: f64 },

    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("parameter '{parameter}' failed to instantiate target '{target}'")]
    BindingInstantiation {
        parameter: String,
        target: String,
        #[source]
        source: Box<CircuitError>,
    },

    #[error("parameter '{parameter}' failed to destroy target '{target}'")]
    BindingDestruction {
        parameter: String,
        target: String,
        #[source]
        source: Box<CircuitError>,
    },

    #[error("group '{group}' has invalid entity count {count}")]
    EntityCount { group: String, count: f64 },

    #[error("'{object}' has no attribute '{attribute}'")]
    UnknownAttribute { object: String, attribute: String },

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("'{0}' is not instantiated")]
    NotInstantiated(String),

    #[error("'{0}' is already instantiated")]
    AlreadyInstantiated(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Simulator(#[from] SimError),
}

/// Collects failures of a best-effort cleanup pass
///
/// The first failure is kept for the caller; later ones are logged and dropped.
#[derive(Debug, Default)]
pub(crate) struct CleanupErrors {
    first: Option<CircuitError>,
}

impl CleanupErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, context: &str, error: impl Into<CircuitError>) {
        let error = error.into();
        if self.first.is_none() {
            self.first = Some(error);
        } else {
            tracing::warn!(target: "synfit-circuit", "Failed to release {}: {}", context, error);
        }
    }

    pub(crate) fn into_result(self) -> CircuitResult<()> {
        self.first.map_or(Ok(()), Err)
    }
}
