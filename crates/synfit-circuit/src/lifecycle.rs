// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle capabilities
//!
//! Anything that owns simulator-native state is `Instantiable` and
//! `Destroyable`. Anything a parameter can be written into is a
//! `BindingTarget`; a target advertises the lifecycle capabilities it has
//! through `as_instantiable`/`as_destroyable`, and a `ParameterBinding` only
//! invokes what is advertised.

use synfit_sim_neural::CellHandle;
use synfit_sim_runtime::Simulator;

use crate::error::CircuitResult;

/// Allocates simulator-native state
pub trait Instantiable {
    fn instantiate(&mut self, sim: &mut dyn Simulator, cell: CellHandle) -> CircuitResult<()>;
}

/// Releases simulator-native state
///
/// Destroying something that holds no native state must succeed.
pub trait Destroyable {
    fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()>;
}

/// An object a parameter value can be written into
pub trait BindingTarget {
    /// Name used in errors and parameter records
    fn target_name(&self) -> String;

    /// Write one named attribute
    fn set_attribute(
        &mut self,
        sim: &mut dyn Simulator,
        attribute: &str,
        value: f64,
    ) -> CircuitResult<()>;

    fn as_instantiable(&mut self) -> Option<&mut dyn Instantiable> {
        None
    }

    fn as_destroyable(&mut self) -> Option<&mut dyn Destroyable> {
        None
    }
}
