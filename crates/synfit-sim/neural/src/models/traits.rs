// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Mechanism model traits

use crate::types::{SimError, SimResult};

/// A mechanism a simulator can instantiate (distributed or point process)
pub trait MechanismModel {
    /// Parameter block carried by every instance of the mechanism
    type Parameters: ModelParameters;

    /// Human-readable model name
    fn model_name(&self) -> &'static str;

    /// Suffix the mechanism is registered under
    fn suffix(&self) -> &'static str;
}

/// Named scalar attributes of a mechanism instance
///
/// Attribute access goes through `get`/`set` so that every write is validated
/// and an invalid write leaves the previous value in place.
pub trait ModelParameters: Default + Clone {
    /// Object name used in error messages
    const MECHANISM: &'static str;

    /// Attribute names, in declaration order
    fn attribute_names() -> &'static [&'static str];

    fn slot(&self, attribute: &str) -> Option<&f64>;

    fn slot_mut(&mut self, attribute: &str) -> Option<&mut f64>;

    /// Validate the full parameter block
    fn validate(&self) -> Result<(), &'static str>;

    fn parameter_count() -> usize {
        Self::attribute_names().len()
    }

    fn get(&self, attribute: &str) -> SimResult<f64> {
        self.slot(attribute)
            .copied()
            .ok_or_else(|| SimError::UnknownAttribute {
                object: Self::MECHANISM.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn set(&mut self, attribute: &str, value: f64) -> SimResult<()> {
        let previous = {
            let slot = self
                .slot_mut(attribute)
                .ok_or_else(|| SimError::UnknownAttribute {
                    object: Self::MECHANISM.to_string(),
                    attribute: attribute.to_string(),
                })?;
            core::mem::replace(slot, value)
        };

        if let Err(reason) = self.validate() {
            if let Some(slot) = self.slot_mut(attribute) {
                *slot = previous;
            }
            return Err(SimError::InvalidParameter {
                attribute: attribute.to_string(),
                value,
                reason,
            });
        }
        Ok(())
    }
}
