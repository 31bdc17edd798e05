// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for simulator operations

use super::ids::{CellHandle, ConnectionHandle, MechanismHandle, PointProcessHandle};

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by a simulator backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("unknown cell: {0}")]
    UnknownCell(CellHandle),

    #[error("unknown mechanism: {0}")]
    UnknownMechanism(MechanismHandle),

    #[error("unknown point process: {0}")]
    UnknownPointProcess(PointProcessHandle),

    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionHandle),

    #[error("mechanism suffix '{0}' is not registered")]
    UnknownSuffix(String),

    #[error("section list '{seclist}' does not exist on {cell}")]
    UnknownSectionList { cell: CellHandle, seclist: String },

    #[error("'{object}' has no attribute '{attribute}'")]
    UnknownAttribute { object: String, attribute: String },

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid parameter value for '{attribute}': {value} ({reason})")]
    InvalidParameter {
        attribute: String,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid run request: {0}")]
    InvalidRunRequest(String),

    #[error("simulator failure: {0}")]
    Backend(String),
}
