// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Synfit Simulator Runtime
//!
//! The simulator context every lifecycle operation is handed.
//!
//! This crate provides:
//! - **Traits** (always available): `Simulator`, `RunRequest`, `RecordingRequest`, `LiveHandles`
//! - **Std Implementation** (behind `std` feature): `StdSimulator`, a reference backend
//!
//! ## Features
//!
//! - `default` = `["std"]`
//! - `std` = Reference backend (handle arenas, exponential-Euler integration)
//!
//! ## Usage
//!
//! ```rust
//! use synfit_sim_runtime::{Simulator, StdSimulator};
//! use synfit_sim_neural::Morphology;
//!
//! let mut sim = StdSimulator::new();
//! let cell = sim.create_cell(&Morphology::single_compartment("simple", 10.0, 10.0)).unwrap();
//! sim.destroy_cell(cell).unwrap();
//! assert!(sim.live_handles().is_empty());
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Traits module (always available)
pub mod traits;

pub use synfit_sim_neural::{SimError, SimResult};
pub use traits::{LiveHandles, RecordingRequest, RunRequest, Simulator};

// Standard library implementation (behind "std" feature)
#[cfg(feature = "std")]
pub mod std_impl;

#[cfg(feature = "std")]
pub use std_impl::{MechanismKind, StdSimulator};

/// Version of the simulator trait API
///
/// Increment this when making breaking changes to the trait API.
pub const SIMULATOR_TRAIT_VERSION: u32 = 1;
