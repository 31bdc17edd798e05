// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Simulator context traits

pub mod simulator;

pub use simulator::{LiveHandles, RecordingRequest, RunRequest, Simulator};
