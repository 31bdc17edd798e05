// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Parameters
//!
//! A `ParameterSpec` is one named scalar the optimizer can address (or a
//! frozen constant). A `ParameterBinding` ties a spec to an attribute name on
//! one or more targets and carries the instantiate/destroy semantics:
//!
//! ```text
//! apply       : target.attribute = value                      (every target)
//! instantiate : apply, then target.instantiate(sim, cell)     (targets that can)
//! destroy     : target.destroy(sim)                           (targets that can)
//! ```
//!
//! Targets are addressed by key (`K`). The owner of the targets resolves the
//! keys into `&mut dyn BindingTarget` for each call, so a binding never holds
//! a borrow of the objects it writes into.

use core::fmt;

use serde::Serialize;
use synfit_sim_neural::CellHandle;
use synfit_sim_runtime::Simulator;
use tracing::debug;

use crate::error::{CircuitError, CircuitResult, CleanupErrors};
use crate::lifecycle::BindingTarget;

/// Named scalar, either free within bounds or frozen at a value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    name: String,
    value: Option<f64>,
    frozen: bool,
    bounds: Option<[f64; 2]>,
}

impl ParameterSpec {
    /// Free parameter searched within `[lower, upper]`
    pub fn free(name: impl Into<String>, lower: f64, upper: f64) -> CircuitResult<Self> {
        let name = name.into();
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(CircuitError::InvalidConfiguration(format!(
                "parameter '{}' has invalid bounds [{}, {}]",
                name, lower, upper
            )));
        }
        Ok(Self {
            name,
            value: None,
            frozen: false,
            bounds: Some([lower, upper]),
        })
    }

    /// Frozen parameter; bounds are never consulted
    pub fn frozen(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            frozen: true,
            bounds: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds.map(|[lower, upper]| (lower, upper))
    }

    /// Store a value; a frozen parameter only accepts its own value
    pub fn set_value(&mut self, value: f64) -> CircuitResult<()> {
        if self.frozen {
            return match self.value {
                Some(current) if current == value => Ok(()),
                Some(current) => Err(CircuitError::FrozenParameter {
                    name: self.name.clone(),
                    value: current,
                }),
                None => Err(CircuitError::MissingValue(self.name.clone())),
            };
        }
        self.value = Some(value);
        Ok(())
    }

    /// Forget the value of a free parameter (frozen values stay)
    pub fn clear_value(&mut self) {
        if !self.frozen {
            self.value = None;
        }
    }

    /// The value to instantiate with
    ///
    /// # Errors
    ///
    /// - `MissingValue` if no value is set
    /// - `ParameterOutOfBounds` if a free value lies outside its bounds
    pub fn resolved_value(&self) -> CircuitResult<f64> {
        let value = self
            .value
            .ok_or_else(|| CircuitError::MissingValue(self.name.clone()))?;
        if !self.frozen {
            if let Some([lower, upper]) = self.bounds {
                if !(lower..=upper).contains(&value) {
                    return Err(CircuitError::ParameterOutOfBounds {
                        name: self.name.clone(),
                        value,
                        lower,
                        upper,
                    });
                }
            }
        }
        Ok(value)
    }
}

/// A parameter bound to an attribute on a set of targets
#[derive(Debug, Clone)]
pub struct ParameterBinding<K> {
    spec: ParameterSpec,
    attribute: String,
    targets: Vec<K>,
}

impl<K> ParameterBinding<K> {
    pub fn new(spec: ParameterSpec, attribute: impl Into<String>, targets: Vec<K>) -> Self {
        Self {
            spec,
            attribute: attribute.into(),
            targets,
        }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    pub fn spec_mut(&mut self) -> &mut ParameterSpec {
        &mut self.spec
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn targets(&self) -> &[K] {
        &self.targets
    }

    pub fn set(&mut self, value: f64) -> CircuitResult<()> {
        self.spec.set_value(value)
    }

    fn wrap_instantiation(&self, target: String, source: CircuitError) -> CircuitError {
        CircuitError::BindingInstantiation {
            parameter: self.spec.name.clone(),
            target,
            source: Box::new(source),
        }
    }

    /// Write the value into every target without invoking any capability
    pub fn apply(
        &self,
        sim: &mut dyn Simulator,
        targets: &mut [&mut dyn BindingTarget],
    ) -> CircuitResult<()> {
        let value = self.spec.resolved_value()?;
        for target in targets.iter_mut() {
            target
                .set_attribute(sim, &self.attribute, value)
                .map_err(|e| self.wrap_instantiation(target.target_name(), e))?;
            debug!(
                target: "synfit-circuit",
                "Set {} in {} to {}",
                self.attribute,
                target.target_name(),
                value
            );
        }
        Ok(())
    }

    /// Write the value into every target, then instantiate the targets that can be
    pub fn instantiate(
        &self,
        sim: &mut dyn Simulator,
        cell: CellHandle,
        targets: &mut [&mut dyn BindingTarget],
    ) -> CircuitResult<()> {
        let value = self.spec.resolved_value()?;
        for target in targets.iter_mut() {
            let name = target.target_name();
            target
                .set_attribute(sim, &self.attribute, value)
                .map_err(|e| self.wrap_instantiation(name.clone(), e))?;
            if let Some(instantiable) = target.as_instantiable() {
                instantiable
                    .instantiate(sim, cell)
                    .map_err(|e| self.wrap_instantiation(name.clone(), e))?;
            }
            debug!(target: "synfit-circuit", "Set {} in {} to {}", self.attribute, name, value);
        }
        Ok(())
    }

    /// Destroy every target that can be destroyed
    ///
    /// Every target is attempted; the first failure is returned and the rest
    /// are logged.
    pub fn destroy(
        &self,
        sim: &mut dyn Simulator,
        targets: &mut [&mut dyn BindingTarget],
    ) -> CircuitResult<()> {
        let mut errors = CleanupErrors::new();
        for target in targets.iter_mut() {
            let name = target.target_name();
            let Some(destroyable) = target.as_destroyable() else {
                continue;
            };
            if let Err(e) = destroyable.destroy(sim) {
                let error = CircuitError::BindingDestruction {
                    parameter: self.spec.name.clone(),
                    target: name.clone(),
                    source: Box::new(e),
                };
                errors.record(&name, error);
            }
        }
        errors.into_result()
    }

    /// Serializable view with resolved target names
    pub fn record(&self, targets: Vec<String>) -> ParameterRecord {
        ParameterRecord {
            name: self.spec.name.clone(),
            value: self.spec.value,
            frozen: self.spec.frozen,
            bounds: self.spec.bounds,
            param_name: self.attribute.clone(),
            targets,
        }
    }
}

/// Flat description of a bound parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    pub name: String,
    pub value: Option<f64>,
    pub frozen: bool,
    pub bounds: Option<[f64; 2]>,
    pub param_name: String,
    pub targets: Vec<String>,
}

impl fmt::Display for ParameterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} {} = ", self.name, self.targets, self.param_name)?;
        match (self.frozen, self.value, self.bounds) {
            (true, Some(value), _) => write!(f, "{}", value),
            (false, _, Some([lower, upper])) => write!(f, "[{}, {}]", lower, upper),
            _ => write!(f, "None"),
        }
    }
}
