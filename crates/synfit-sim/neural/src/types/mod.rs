// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Simulator Types Module
//!
//! Core type definitions shared by simulator backends and the circuit layer.

pub mod error;
pub mod ids;
pub mod location;
pub mod morphology;
pub mod trace;

// Re-export commonly used types
pub use error::{SimError, SimResult};
pub use ids::{CellHandle, ConnectionHandle, MechanismHandle, PointProcessHandle};
pub use location::{CompLocation, SeclistLocation};
pub use morphology::{Morphology, Section, ALL_SECTIONS};
pub use trace::{Responses, Trace};
