// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Mechanism Models
//!
//! Trait-based mechanism models used by simulator backends.
//!
//! ## Adding a New Mechanism
//!
//! 1. Create `src/models/your_mechanism.rs`
//! 2. Implement `MechanismModel` and `ModelParameters`
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod exp_syn;
pub mod membrane;
pub mod passive;
pub mod traits;

// Re-export core types
pub use exp_syn::{ExpSynModel, ExpSynParameters};
pub use passive::{PassiveModel, PassiveParameters, SectionProperties};
pub use traits::{MechanismModel, ModelParameters};
