// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Circuit Model
//!
//! Composes a morphology, static mechanisms, section-list targets and entity
//! groups into one simulatable unit addressed by a flat name → value mapping.
//!
//! ## Instantiation Order
//!
//! ```text
//! 0. validate count bindings, parameter values and group
//!    configurations                                            (no allocation)
//! 1. apply every parameter to its targets                      (no allocation)
//! 2. create the cell from the morphology
//! 3. insert static mechanisms
//! 4. instantiate entity groups in declaration order
//! 5. instantiate every parameter binding (groups already built are left as is)
//! ```
//!
//! Destruction runs the reverse order and is best-effort: every stage is
//! attempted, the first failure is returned and the rest are logged.

use std::collections::BTreeMap;
use std::sync::Arc;

use synfit_sim_neural::{CellHandle, Morphology, Responses, SeclistLocation};
use synfit_sim_runtime::{RunRequest, Simulator};
use tracing::{debug, warn};

use crate::error::{CircuitError, CircuitResult, CleanupErrors};
use crate::group::{EntityGroup, COUNT_ATTRIBUTE};
use crate::lifecycle::{BindingTarget, Destroyable, Instantiable};
use crate::mechanism::{DistributedMechanism, SectionListTarget};
use crate::parameter::{ParameterBinding, ParameterRecord, ParameterSpec};

/// Parameter name → value
pub type ParameterValues = BTreeMap<String, f64>;

/// Address of a model-level binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Group(usize),
    SectionList(usize),
}

/// Circuit on one morphology
#[derive(Debug)]
pub struct CircuitModel {
    name: String,
    morphology: Arc<Morphology>,
    mechanisms: Vec<DistributedMechanism>,
    section_lists: Vec<SectionListTarget>,
    groups: Vec<EntityGroup>,
    params: Vec<ParameterBinding<TargetRef>>,
    cell: Option<CellHandle>,
}

/// Targets addressed by `keys`, each at most once, in declaration order
fn resolve_targets<'a>(
    keys: &[TargetRef],
    groups: &'a mut [EntityGroup],
    section_lists: &'a mut [SectionListTarget],
) -> Vec<&'a mut dyn BindingTarget> {
    let groups = groups
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| keys.contains(&TargetRef::Group(*i)))
        .map(|(_, group)| group as &mut dyn BindingTarget);
    let section_lists = section_lists
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| keys.contains(&TargetRef::SectionList(*i)))
        .map(|(_, list)| list as &mut dyn BindingTarget);
    groups.chain(section_lists).collect()
}

impl CircuitModel {
    pub fn new(name: impl Into<String>, morphology: Arc<Morphology>) -> Self {
        Self {
            name: name.into(),
            morphology,
            mechanisms: Vec::new(),
            section_lists: Vec::new(),
            groups: Vec::new(),
            params: Vec::new(),
            cell: None,
        }
    }

    pub fn add_mechanism(&mut self, mechanism: DistributedMechanism) {
        self.mechanisms.push(mechanism);
    }

    /// Register a section list as a binding target (reused if already registered)
    pub fn add_section_list(&mut self, location: SeclistLocation) -> TargetRef {
        if let Some(i) = self
            .section_lists
            .iter()
            .position(|list| *list.location() == location)
        {
            return TargetRef::SectionList(i);
        }
        self.section_lists.push(SectionListTarget::new(location));
        TargetRef::SectionList(self.section_lists.len() - 1)
    }

    pub fn add_group(&mut self, group: EntityGroup) -> CircuitResult<TargetRef> {
        if self.groups.iter().any(|g| g.name() == group.name()) {
            return Err(CircuitError::InvalidConfiguration(format!(
                "group '{}' is declared more than once",
                group.name()
            )));
        }
        self.groups.push(group);
        Ok(TargetRef::Group(self.groups.len() - 1))
    }

    /// Bind a parameter to `attribute` on `targets`
    ///
    /// # Errors
    ///
    /// - `DuplicateParameter` if the name is already used
    /// - `UnknownTarget` if a target is not registered, or none is given
    /// - `UnknownAttribute` if a group target has no such attribute
    pub fn add_parameter(
        &mut self,
        spec: ParameterSpec,
        attribute: impl Into<String>,
        targets: Vec<TargetRef>,
    ) -> CircuitResult<()> {
        let attribute = attribute.into();
        if self.params.iter().any(|p| p.name() == spec.name()) {
            return Err(CircuitError::DuplicateParameter(spec.name().to_string()));
        }
        if targets.is_empty() {
            return Err(CircuitError::UnknownTarget(format!(
                "parameter '{}' has no targets",
                spec.name()
            )));
        }

        let mut unique = Vec::with_capacity(targets.len());
        for target in targets {
            match target {
                TargetRef::Group(i) => {
                    let group = self
                        .groups
                        .get(i)
                        .ok_or_else(|| CircuitError::UnknownTarget(format!("group #{}", i)))?;
                    if !group.accepts_attribute(&attribute) {
                        return Err(CircuitError::UnknownAttribute {
                            object: group.name().to_string(),
                            attribute,
                        });
                    }
                }
                TargetRef::SectionList(i) => {
                    if i >= self.section_lists.len() {
                        return Err(CircuitError::UnknownTarget(format!("section list #{}", i)));
                    }
                }
            }
            if !unique.contains(&target) {
                unique.push(target);
            }
        }

        self.params
            .push(ParameterBinding::new(spec, attribute, unique));
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn morphology(&self) -> &Arc<Morphology> {
        &self.morphology
    }

    pub fn cell(&self) -> Option<CellHandle> {
        self.cell
    }

    pub fn is_instantiated(&self) -> bool {
        self.cell.is_some()
    }

    pub fn groups(&self) -> &[EntityGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&EntityGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn mechanisms(&self) -> &[DistributedMechanism] {
        &self.mechanisms
    }

    pub fn parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter().map(|p| p.spec())
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters().find(|spec| spec.name() == name)
    }

    /// Names of the free parameters, in declaration order
    pub fn free_param_names(&self) -> Vec<String> {
        self.parameters()
            .filter(|spec| !spec.is_frozen())
            .map(|spec| spec.name().to_string())
            .collect()
    }

    /// `(name, lower, upper)` of every free parameter
    pub fn param_bounds(&self) -> Vec<(String, f64, f64)> {
        self.parameters()
            .filter(|spec| !spec.is_frozen())
            .filter_map(|spec| {
                spec.bounds()
                    .map(|(lower, upper)| (spec.name().to_string(), lower, upper))
            })
            .collect()
    }

    /// Every binding with its target names resolved
    pub fn parameter_records(&self) -> Vec<ParameterRecord> {
        self.params
            .iter()
            .map(|binding| {
                let names = binding
                    .targets()
                    .iter()
                    .map(|target| match *target {
                        TargetRef::Group(i) => self.groups[i].name().to_string(),
                        TargetRef::SectionList(i) => {
                            self.section_lists[i].location().name.clone()
                        }
                    })
                    .collect();
                binding.record(names)
            })
            .collect()
    }

    /// Check that `values` names exactly the free parameters
    pub fn check_parameter_names(&self, values: &ParameterValues) -> CircuitResult<()> {
        let free = self.free_param_names();
        let missing: Vec<String> = free
            .iter()
            .filter(|name| !values.contains_key(*name))
            .cloned()
            .collect();
        let unknown: Vec<String> = values
            .keys()
            .filter(|name| !free.contains(name))
            .cloned()
            .collect();
        if missing.is_empty() && unknown.is_empty() {
            Ok(())
        } else {
            Err(CircuitError::ParameterMismatch { missing, unknown })
        }
    }

    /// Set the values of the named parameters
    pub fn freeze(&mut self, values: &ParameterValues) -> CircuitResult<()> {
        for (name, value) in values {
            let binding = self
                .params
                .iter_mut()
                .find(|p| p.name() == name)
                .ok_or_else(|| CircuitError::ParameterMismatch {
                    missing: Vec::new(),
                    unknown: vec![name.clone()],
                })?;
            binding.set(*value)?;
        }
        Ok(())
    }

    /// Clear the values of the named free parameters
    pub fn unfreeze<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if let Some(binding) = self.params.iter_mut().find(|p| p.name() == name.as_ref()) {
                binding.spec_mut().clear_value();
            }
        }
    }

    /// Every group needs a parameter bound to its entity count
    fn check_count_bindings(&self) -> CircuitResult<()> {
        for (i, group) in self.groups.iter().enumerate() {
            let bound = self.params.iter().any(|binding| {
                binding.attribute() == COUNT_ATTRIBUTE
                    && binding.targets().contains(&TargetRef::Group(i))
            });
            if !bound {
                return Err(CircuitError::MissingValue(format!(
                    "{}.{}",
                    group.name(),
                    COUNT_ATTRIBUTE
                )));
            }
        }
        Ok(())
    }

    /// Build the circuit in `sim`
    ///
    /// Values and group configurations are validated before anything is
    /// allocated. A failure after that point leaves partially built state
    /// behind; call `destroy` (or use `instantiate_scoped`) to release it.
    pub fn instantiate(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        if self.cell.is_some() {
            return Err(CircuitError::AlreadyInstantiated(self.name.clone()));
        }

        self.check_count_bindings()?;
        for binding in &self.params {
            binding.spec().resolved_value()?;
        }
        for binding in &self.params {
            let mut targets =
                resolve_targets(binding.targets(), &mut self.groups, &mut self.section_lists);
            binding.apply(sim, &mut targets)?;
        }
        for group in &self.groups {
            group.check_ready()?;
        }

        let cell = sim.create_cell(&self.morphology)?;
        self.cell = Some(cell);

        for mechanism in self.mechanisms.iter_mut() {
            mechanism.instantiate(sim, cell)?;
        }
        for group in self.groups.iter_mut() {
            group.instantiate(sim, cell)?;
        }
        for binding in &self.params {
            let mut targets =
                resolve_targets(binding.targets(), &mut self.groups, &mut self.section_lists);
            binding.instantiate(sim, cell, &mut targets)?;
        }

        debug!(
            target: "synfit-circuit",
            "Instantiated '{}' as {} ({} groups, {} entities)",
            self.name,
            cell,
            self.groups.len(),
            self.groups.iter().map(|g| g.entities().len()).sum::<usize>()
        );
        Ok(())
    }

    /// Release everything `instantiate` allocated
    ///
    /// Safe to call on a model that was never (or only partially) instantiated.
    pub fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let mut errors = CleanupErrors::new();

        for binding in &self.params {
            let mut targets =
                resolve_targets(binding.targets(), &mut self.groups, &mut self.section_lists);
            if let Err(e) = binding.destroy(sim, &mut targets) {
                errors.record(binding.name(), e);
            }
        }
        for group in self.groups.iter_mut() {
            if let Err(e) = group.destroy(sim) {
                errors.record(group.name(), e);
            }
        }
        for mechanism in self.mechanisms.iter_mut().rev() {
            if let Err(e) = mechanism.destroy(sim) {
                errors.record(mechanism.name(), e);
            }
        }
        if let Some(cell) = self.cell.take() {
            if let Err(e) = sim.destroy_cell(cell) {
                errors.record(&cell.to_string(), e);
            }
            debug!(target: "synfit-circuit", "Destroyed '{}' ({})", self.name, cell);
        }

        errors.into_result()
    }

    /// Instantiate and return a guard that destroys the circuit when dropped
    ///
    /// If instantiation fails, whatever was built is destroyed before the
    /// error is returned.
    pub fn instantiate_scoped<'a>(
        &'a mut self,
        sim: &'a mut dyn Simulator,
    ) -> CircuitResult<InstantiatedCircuit<'a>> {
        if self.cell.is_some() {
            return Err(CircuitError::AlreadyInstantiated(self.name.clone()));
        }
        if let Err(error) = self.instantiate(sim) {
            if let Err(cleanup) = self.destroy(sim) {
                warn!(
                    target: "synfit-circuit",
                    "Cleanup after failed instantiation of '{}' also failed: {}",
                    self.name,
                    cleanup
                );
            }
            return Err(error);
        }
        let cell = self
            .cell
            .ok_or_else(|| CircuitError::NotInstantiated(self.name.clone()))?;
        Ok(InstantiatedCircuit {
            model: self,
            sim,
            cell,
            released: false,
        })
    }
}

/// A live circuit; destroyed on drop unless released explicitly
pub struct InstantiatedCircuit<'a> {
    model: &'a mut CircuitModel,
    sim: &'a mut dyn Simulator,
    cell: CellHandle,
    released: bool,
}

impl<'a> InstantiatedCircuit<'a> {
    pub fn cell(&self) -> CellHandle {
        self.cell
    }

    pub fn model(&self) -> &CircuitModel {
        self.model
    }

    pub fn simulator(&mut self) -> &mut dyn Simulator {
        &mut *self.sim
    }

    /// Run one simulation of the live cell
    pub fn run(&mut self, request: &RunRequest) -> CircuitResult<Responses> {
        Ok(self.sim.run(self.cell, request)?)
    }

    /// Destroy now and report the outcome
    pub fn release(mut self) -> CircuitResult<()> {
        self.released = true;
        self.model.destroy(&mut *self.sim)
    }
}

impl Drop for InstantiatedCircuit<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.model.destroy(&mut *self.sim) {
            warn!(
                target: "synfit-circuit",
                "Destroying '{}' on scope exit failed: {}",
                self.model.name(),
                e
            );
        }
    }
}
