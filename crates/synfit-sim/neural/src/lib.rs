// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Synfit Simulator Types
//!
//! Everything a simulator backend and the circuit lifecycle layer need to agree on:
//! - **Types**: opaque native handles, locations, morphology, recorded traces, errors
//! - **Models**: mechanism models (passive leak, exponential synapse) and the
//!   membrane update used by the reference backend
//!
//! Nothing here allocates simulator-native state; see `synfit-sim-runtime` for the
//! `Simulator` context that does.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Core type definitions
pub mod types;

// Mechanism models
pub mod models;

// Re-export types
pub use types::{
    CellHandle, CompLocation, ConnectionHandle, MechanismHandle, Morphology, PointProcessHandle,
    Responses, Section, SeclistLocation, SimError, SimResult, Trace,
};

// Re-export mechanism models
pub use models::{
    ExpSynModel, ExpSynParameters, MechanismModel, ModelParameters, PassiveModel,
    PassiveParameters, SectionProperties,
};
