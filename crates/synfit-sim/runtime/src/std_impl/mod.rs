// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Synfit Simulator - Standard (Desktop/Server)
//!
//! Reference backend for desktop and server environments.
//!
//! ## Model
//! - Every section is one isopotential compartment
//! - Exponential-Euler membrane update
//! - Built-in mechanisms: `pas` (distributed), `ExpSyn` (point process, alias `MyExpSyn`)
//!
//! This module is only available when the `std` feature is enabled.

pub mod simulator;

pub use simulator::{MechanismKind, StdSimulator};
