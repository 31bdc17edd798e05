// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Point-process entity: one mechanism instance at each of its compartments

use synfit_sim_neural::{CellHandle, CompLocation, PointProcessHandle};
use synfit_sim_runtime::Simulator;
use tracing::{trace, warn};

use crate::error::{CircuitError, CircuitResult};
use crate::lifecycle::{BindingTarget, Destroyable, Instantiable};

/// One simulated point-process entity
///
/// An entity spans all of its locations: it owns one native point process per
/// location, and attribute writes reach every one of them. The native handles
/// exist only between `instantiate` and `destroy`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointProcess {
    name: String,
    suffix: String,
    locations: Vec<CompLocation>,
    handles: Vec<PointProcessHandle>,
}

impl PointProcess {
    pub fn new(
        name: impl Into<String>,
        suffix: impl Into<String>,
        locations: Vec<CompLocation>,
    ) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
            locations,
            handles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn locations(&self) -> &[CompLocation] {
        &self.locations
    }

    /// Native handles, in location order
    pub fn handles(&self) -> &[PointProcessHandle] {
        &self.handles
    }

    pub fn is_instantiated(&self) -> bool {
        !self.handles.is_empty()
    }
}

impl Instantiable for PointProcess {
    /// Allocate one mechanism per location; a failure releases what this
    /// entity allocated and leaves it empty
    fn instantiate(&mut self, sim: &mut dyn Simulator, cell: CellHandle) -> CircuitResult<()> {
        if self.is_instantiated() {
            return Err(CircuitError::AlreadyInstantiated(self.name.clone()));
        }
        for location in &self.locations {
            match sim.create_point_process(cell, location, &self.suffix) {
                Ok(handle) => {
                    trace!(target: "synfit-circuit", "Instantiated {} as {} at {}", self.name, handle, location);
                    self.handles.push(handle);
                }
                Err(e) => {
                    for handle in self.handles.drain(..) {
                        if let Err(release) = sim.destroy_point_process(handle) {
                            warn!(target: "synfit-circuit", "Failed to release {} of {}: {}", handle, self.name, release);
                        }
                    }
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

impl Destroyable for PointProcess {
    /// Release every handle, returning the first failure
    fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let mut first = None;
        for handle in self.handles.drain(..) {
            if let Err(e) = sim.destroy_point_process(handle) {
                first.get_or_insert(e);
            }
        }
        match first {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Entities are written into as locations: attribute writes only, the
/// lifecycle stays with the owning group
impl BindingTarget for PointProcess {
    fn target_name(&self) -> String {
        self.name.clone()
    }

    fn set_attribute(
        &mut self,
        sim: &mut dyn Simulator,
        attribute: &str,
        value: f64,
    ) -> CircuitResult<()> {
        if self.handles.is_empty() {
            return Err(CircuitError::NotInstantiated(self.name.clone()));
        }
        for handle in &self.handles {
            sim.set_point_process_attribute(*handle, attribute, value)?;
        }
        Ok(())
    }
}
