// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # synfit-observability
//!
//! Logging setup shared by synfit binaries and test harnesses, with
//! per-crate debug flag support.
//!
//! Library crates only emit `tracing` events under their crate name as the
//! target (`target: "synfit-circuit"`); installing a subscriber is left to
//! the process that drives the optimisation.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with a combined JSON log file

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known synfit crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "synfit-config",
    "synfit-sim-runtime",
    "synfit-circuit",
    "synfit-evolutionary",
];
