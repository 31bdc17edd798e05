// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Static mechanisms and section-list parameters

use synfit_sim_neural::{CellHandle, MechanismHandle, SeclistLocation};
use synfit_sim_runtime::Simulator;

use crate::error::{CircuitError, CircuitResult, CleanupErrors};
use crate::lifecycle::{BindingTarget, Destroyable, Instantiable};

/// A distributed mechanism (e.g. `pas`) inserted on whole section lists
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedMechanism {
    name: String,
    suffix: String,
    locations: Vec<SeclistLocation>,
    handles: Vec<MechanismHandle>,
}

impl DistributedMechanism {
    pub fn new(
        name: impl Into<String>,
        suffix: impl Into<String>,
        locations: Vec<SeclistLocation>,
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

    pub fn is_instantiated(&self) -> bool {
        !self.handles.is_empty()
    }
}

impl Instantiable for DistributedMechanism {
    fn instantiate(&mut self, sim: &mut dyn Simulator, cell: CellHandle) -> CircuitResult<()> {
        if self.is_instantiated() {
            return Err(CircuitError::AlreadyInstantiated(self.name.clone()));
        }
        for location in &self.locations {
            let handle = sim.insert_mechanism(cell, location, &self.suffix)?;
            self.handles.push(handle);
        }
        Ok(())
    }
}

impl Destroyable for DistributedMechanism {
    fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let mut errors = CleanupErrors::new();
        for handle in self.handles.drain(..) {
            if let Err(e) = sim.remove_mechanism(handle) {
                errors.record(&format!("{} ({})", self.name, handle), e);
            }
        }
        errors.into_result()
    }
}

/// A section list parameters can be written into (`cm`, `g_pas`, ...)
///
/// Values are collected by `set_attribute` and pushed into the simulator on
/// `instantiate`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionListTarget {
    location: SeclistLocation,
    values: Vec<(String, f64)>,
}

impl SectionListTarget {
    pub fn new(location: SeclistLocation) -> Self {
        Self {
            location,
            values: Vec::new(),
        }
    }

    pub fn location(&self) -> &SeclistLocation {
        &self.location
    }

    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| *value)
    }
}

impl Instantiable for SectionListTarget {
    fn instantiate(&mut self, sim: &mut dyn Simulator, cell: CellHandle) -> CircuitResult<()> {
        for (attribute, value) in &self.values {
            sim.set_section_attribute(cell, &self.location, attribute, *value)?;
        }
        Ok(())
    }
}

impl BindingTarget for SectionListTarget {
    fn target_name(&self) -> String {
        self.location.name.clone()
    }

    fn set_attribute(
        &mut self,
        _sim: &mut dyn Simulator,
        attribute: &str,
        value: f64,
    ) -> CircuitResult<()> {
        match self.values.iter_mut().find(|(name, _)| name == attribute) {
            Some(slot) => slot.1 = value,
            None => self.values.push((attribute.to_string(), value)),
        }
        Ok(())
    }

    fn as_instantiable(&mut self) -> Option<&mut dyn Instantiable> {
        Some(self)
    }
}
