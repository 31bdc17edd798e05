// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Entity Group
//!
//! A resizable assembly of point processes sharing one mechanism suffix, one
//! set of fixed and free parameters, and one spike event source. The entity
//! count is itself a parameter, so the group is rebuilt from scratch on every
//! instantiation instead of being resized in place.
//!
//! ## Instantiation
//!
//! ```text
//! 1. n = round(count)          (EntityCount if negative, non-finite or above MAX_ENTITIES)
//! 2. entities[i] = PointProcess(suffix, locations); instantiate each,
//!    one native point process per location
//! 3. source.destinations = every entity handle; instantiate source
//! 4. one ParameterBinding per fixed, then per free parameter,
//!    bound to all n entities at once
//! ```
//!
//! Entities are independent: when entity `k` fails, entities `0..k` stay
//! allocated until `destroy`, which always releases them.

use ahash::AHashMap;
use synfit_sim_neural::{CellHandle, CompLocation};
use synfit_sim_runtime::Simulator;
use tracing::debug;

use crate::error::{CircuitError, CircuitResult, CleanupErrors};
use crate::lifecycle::{BindingTarget, Destroyable, Instantiable};
use crate::parameter::{ParameterBinding, ParameterSpec};
use crate::point_process::PointProcess;
use crate::spike_source::SpikeEventSource;

/// Attribute name of the entity count
pub const COUNT_ATTRIBUTE: &str = "n";

/// Largest entity count a group will build
pub const MAX_ENTITIES: usize = 100_000;

/// Configuration the current entities were built with
#[derive(Debug, Clone, PartialEq)]
struct LiveConfig {
    cell: CellHandle,
    count: usize,
    free: Vec<f64>,
}

/// Group of point processes driven by one event source
#[derive(Debug)]
pub struct EntityGroup {
    name: String,
    suffix: String,
    locations: Vec<CompLocation>,
    source: SpikeEventSource,
    fixed: Vec<(String, f64)>,
    free: Vec<(String, Option<f64>)>,
    count: f64,
    entities: Vec<PointProcess>,
    param_objects: AHashMap<String, ParameterBinding<usize>>,
    live: Option<LiveConfig>,
}

impl EntityGroup {
    /// Create an empty group
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `locations` is empty.
    pub fn new(
        name: impl Into<String>,
        suffix: impl Into<String>,
        locations: Vec<CompLocation>,
        source: SpikeEventSource,
    ) -> CircuitResult<Self> {
        let name = name.into();
        if locations.is_empty() {
            return Err(CircuitError::InvalidConfiguration(format!(
                "group '{}' needs at least one location",
                name
            )));
        }
        Ok(Self {
            name,
            suffix: suffix.into(),
            locations,
            source,
            fixed: Vec::new(),
            free: Vec::new(),
            count: 0.0,
            entities: Vec::new(),
            param_objects: AHashMap::new(),
            live: None,
        })
    }

    /// Parameter applied to every entity with a constant value
    pub fn with_fixed(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        self.fixed.retain(|(existing, _)| *existing != name);
        self.fixed.push((name, value));
        self
    }

    /// Parameter applied to every entity with a value set from outside
    pub fn with_free(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.free.iter().any(|(existing, _)| *existing == name) {
            self.free.push((name, None));
        }
        self
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

    pub fn source(&self) -> &SpikeEventSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut SpikeEventSource {
        &mut self.source
    }

    pub fn entities(&self) -> &[PointProcess] {
        &self.entities
    }

    pub fn fixed_parameters(&self) -> &[(String, f64)] {
        &self.fixed
    }

    /// Current value of a fixed or free parameter
    pub fn parameter_value(&self, name: &str) -> Option<f64> {
        self.fixed
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .or_else(|| self.free.iter().find(|(n, _)| n == name).and_then(|(_, v)| *v))
    }

    pub fn param_objects(&self) -> &AHashMap<String, ParameterBinding<usize>> {
        &self.param_objects
    }

    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn set_count(&mut self, count: f64) {
        self.count = count;
    }

    pub fn is_instantiated(&self) -> bool {
        self.live.is_some()
    }

    /// Whether `attribute` can be written through a binding
    pub fn accepts_attribute(&self, attribute: &str) -> bool {
        attribute == COUNT_ATTRIBUTE || self.free.iter().any(|(name, _)| name == attribute)
    }

    /// Store the value of a free parameter
    pub fn set_free_value(&mut self, name: &str, value: f64) -> CircuitResult<()> {
        let slot = self
            .free
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| CircuitError::UnknownAttribute {
                object: self.name.clone(),
                attribute: name.to_string(),
            })?;
        slot.1 = Some(value);
        Ok(())
    }

    /// `round(count)`, rejecting negative, non-finite and oversized counts
    pub fn entity_count(&self) -> CircuitResult<usize> {
        if !self.count.is_finite()
            || self.count < 0.0
            || self.count.round() > MAX_ENTITIES as f64
        {
            return Err(CircuitError::EntityCount {
                group: self.name.clone(),
                count: self.count,
            });
        }
        Ok(self.count.round() as usize)
    }

    fn free_values(&self) -> CircuitResult<Vec<f64>> {
        self.free
            .iter()
            .map(|(name, value)| {
                value.ok_or_else(|| CircuitError::MissingValue(format!("{}.{}", self.name, name)))
            })
            .collect()
    }

    /// Validate count and free values without touching the simulator
    pub fn check_ready(&self) -> CircuitResult<usize> {
        let count = self.entity_count()?;
        self.free_values()?;
        Ok(count)
    }

    fn build(
        &mut self,
        sim: &mut dyn Simulator,
        cell: CellHandle,
        count: usize,
        free: Vec<f64>,
    ) -> CircuitResult<()> {
        let live = LiveConfig {
            cell,
            count,
            free: free.clone(),
        };

        let locations = &self.locations;
        self.entities = (0..count)
            .map(|i| {
                PointProcess::new(
                    format!("{}_{}", self.suffix, i),
                    self.suffix.clone(),
                    locations.clone(),
                )
            })
            .collect();
        for entity in self.entities.iter_mut() {
            entity.instantiate(sim, cell)?;
        }

        self.source.set_destinations(
            self.entities
                .iter()
                .flat_map(|entity| entity.handles().iter().copied())
                .collect(),
        );
        self.source.instantiate(sim, cell)?;

        let parameters = self
            .fixed
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .chain(self.free.iter().map(|(name, _)| name.clone()).zip(free))
            .collect::<Vec<_>>();

        for (name, value) in parameters {
            let binding = ParameterBinding::new(
                ParameterSpec::frozen(format!("param_{}_{}", self.suffix, name), value),
                name.clone(),
                (0..count).collect(),
            );
            let mut targets: Vec<&mut dyn BindingTarget> = self
                .entities
                .iter_mut()
                .map(|entity| entity as &mut dyn BindingTarget)
                .collect();
            binding.instantiate(sim, cell, &mut targets)?;
            self.param_objects.insert(name, binding);
        }

        self.live = Some(live);
        debug!(
            target: "synfit-circuit",
            "Group '{}' instantiated {} x {}",
            self.name,
            count,
            self.suffix
        );
        Ok(())
    }

    /// Release entities, source and parameter objects, keeping `count`
    fn release(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let mut errors = CleanupErrors::new();
        for entity in self.entities.iter_mut() {
            if let Err(e) = entity.destroy(sim) {
                errors.record(entity.name(), e);
            }
        }
        if let Err(e) = self.source.destroy(sim) {
            errors.record(self.source.name(), e);
        }

        self.entities.clear();
        self.param_objects.clear();
        self.live = None;
        errors.into_result()
    }
}

impl Instantiable for EntityGroup {
    /// Build the group; a live group is rebuilt unless it already matches the
    /// current count and free values
    fn instantiate(&mut self, sim: &mut dyn Simulator, cell: CellHandle) -> CircuitResult<()> {
        let count = self.entity_count()?;
        let free = self.free_values()?;

        if let Some(live) = &self.live {
            if live.cell == cell && live.count == count && live.free == free {
                return Ok(());
            }
            debug!(target: "synfit-circuit", "Group '{}' configuration changed, rebuilding", self.name);
        }
        // Also clears what a failed build left behind
        self.release(sim)?;
        self.build(sim, cell, count, free)
    }
}

impl Destroyable for EntityGroup {
    /// Release everything and reset the count; a no-op on an empty group
    fn destroy(&mut self, sim: &mut dyn Simulator) -> CircuitResult<()> {
        let result = self.release(sim);
        self.count = 0.0;
        result
    }
}

impl BindingTarget for EntityGroup {
    fn target_name(&self) -> String {
        self.name.clone()
    }

    fn set_attribute(
        &mut self,
        _sim: &mut dyn Simulator,
        attribute: &str,
        value: f64,
    ) -> CircuitResult<()> {
        if attribute == COUNT_ATTRIBUTE {
            self.count = value;
            return Ok(());
        }
        self.set_free_value(attribute, value)
    }

    fn as_instantiable(&mut self) -> Option<&mut dyn Instantiable> {
        Some(self)
    }

    fn as_destroyable(&mut self) -> Option<&mut dyn Destroyable> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::FixedIntervals;
    use synfit_sim_neural::Morphology;
    use synfit_sim_runtime::StdSimulator;

    fn setup() -> (StdSimulator, CellHandle) {
        let mut sim = StdSimulator::new();
        let cell = sim
            .create_cell(&Morphology::single_compartment("simple", 10.0, 10.0))
            .unwrap();
        (sim, cell)
    }

    fn group() -> EntityGroup {
        let loc = CompLocation::new("somacenter", "somatic", 0, 0.5).unwrap();
        let source = SpikeEventSource::new("netstim", FixedIntervals::default(), 65.0);
        EntityGroup::new("syn_circuit", "MyExpSyn", vec![loc], source)
            .unwrap()
            .with_fixed("tau", 14.0)
            .with_free("gmax")
    }

    #[test]
    fn test_instantiate_builds_n_uniform_entities() {
        let (mut sim, cell) = setup();
        let mut g = group();
        g.set_count(3.4);
        g.set_free_value("gmax", 0.002).unwrap();

        g.instantiate(&mut sim, cell).unwrap();
        assert_eq!(g.entities().len(), 3);
        assert_eq!(g.source().connections().len(), 3);
        assert_eq!(g.param_objects().len(), 2);
        for entity in g.entities() {
            let handle = entity.handles()[0];
            assert_eq!(sim.point_process_attribute(handle, "tau").unwrap(), 14.0);
            assert_eq!(sim.point_process_attribute(handle, "gmax").unwrap(), 0.002);
        }
    }

    #[test]
    fn test_destroy_restores_empty_state() {
        let (mut sim, cell) = setup();
        let mut g = group();
        g.set_count(5.0);
        g.set_free_value("gmax", 0.001).unwrap();
        g.instantiate(&mut sim, cell).unwrap();

        g.destroy(&mut sim).unwrap();
        assert!(g.entities().is_empty());
        assert!(g.param_objects().is_empty());
        assert!(g.source().destinations().is_empty());
        assert_eq!(g.count(), 0.0);
        assert_eq!(sim.live_handles().point_processes, 0);
        assert_eq!(sim.live_handles().connections, 0);

        // Idempotent
        g.destroy(&mut sim).unwrap();
    }

    #[test]
    fn test_zero_entities() {
        let (mut sim, cell) = setup();
        let mut g = group();
        g.set_count(0.0);
        g.set_free_value("gmax", 0.001).unwrap();
        g.instantiate(&mut sim, cell).unwrap();
        assert!(g.entities().is_empty());
        assert!(g.source().destinations().is_empty());
        assert!(g.is_instantiated());
        g.destroy(&mut sim).unwrap();
    }

    #[test]
    fn test_invalid_counts() {
        let (mut sim, cell) = setup();
        for count in [-1.0, f64::NAN, f64::INFINITY, 1e19, MAX_ENTITIES as f64 + 1.0] {
            let mut g = group();
            g.set_count(count);
            g.set_free_value("gmax", 0.001).unwrap();
            assert!(matches!(
                g.instantiate(&mut sim, cell),
                Err(CircuitError::EntityCount { .. })
            ));
            assert!(g.entities().is_empty());
        }
        assert_eq!(sim.live_handles().point_processes, 0);
    }

    #[test]
    fn test_missing_free_value() {
        let (mut sim, cell) = setup();
        let mut g = group();
        g.set_count(2.0);
        assert!(matches!(
            g.instantiate(&mut sim, cell),
            Err(CircuitError::MissingValue(_))
        ));
        assert_eq!(sim.live_handles().point_processes, 0);
    }

    #[test]
    fn test_reinstantiate_unchanged_is_noop_changed_rebuilds() {
        let (mut sim, cell) = setup();
        let mut g = group();
        g.set_count(2.0);
        g.set_free_value("gmax", 0.001).unwrap();
        g.instantiate(&mut sim, cell).unwrap();
        let before: Vec<_> = g.entities().iter().map(|e| e.handles().to_vec()).collect();

        g.instantiate(&mut sim, cell).unwrap();
        let same: Vec<_> = g.entities().iter().map(|e| e.handles().to_vec()).collect();
        assert_eq!(before, same);

        g.set_count(4.0);
        g.instantiate(&mut sim, cell).unwrap();
        assert_eq!(g.entities().len(), 4);
        assert_eq!(sim.live_handles().point_processes, 4);
        assert_eq!(sim.live_handles().connections, 4);
    }

    #[test]
    fn test_every_entity_spans_all_locations() {
        let (mut sim, cell) = setup();
        let a = CompLocation::new("a", "somatic", 0, 0.2).unwrap();
        let b = CompLocation::new("b", "somatic", 0, 0.8).unwrap();
        let source = SpikeEventSource::new("netstim", FixedIntervals::default(), 65.0);
        let mut g = EntityGroup::new("pair", "ExpSyn", vec![a.clone(), b.clone()], source)
            .unwrap()
            .with_free("gmax");
        g.set_count(3.0);
        g.set_free_value("gmax", 0.002).unwrap();
        g.instantiate(&mut sim, cell).unwrap();

        assert_eq!(g.entities().len(), 3);
        for entity in g.entities() {
            assert_eq!(entity.locations(), &[a.clone(), b.clone()][..]);
            assert_eq!(entity.handles().len(), 2);
            for handle in entity.handles() {
                assert_eq!(sim.point_process_attribute(*handle, "gmax").unwrap(), 0.002);
            }
        }
        assert_eq!(sim.live_handles().point_processes, 6);
        assert_eq!(g.source().destinations().len(), 6);
        assert_eq!(sim.live_handles().connections, 6);

        g.destroy(&mut sim).unwrap();
        assert!(sim.live_handles().point_processes == 0 && sim.live_handles().connections == 0);
    }

    #[test]
    fn test_binding_target_attributes() {
        let (mut sim, _cell) = setup();
        let mut g = group();
        g.set_attribute(&mut sim, "n", 7.0).unwrap();
        g.set_attribute(&mut sim, "gmax", 0.003).unwrap();
        assert_eq!(g.count(), 7.0);
        assert_eq!(g.parameter_value("gmax"), Some(0.003));
        assert_eq!(g.parameter_value("tau"), Some(14.0));
        assert!(g.set_attribute(&mut sim, "tau", 1.0).is_err());
        assert!(g.accepts_attribute("n"));
        assert!(!g.accepts_attribute("tau"));
    }
}
