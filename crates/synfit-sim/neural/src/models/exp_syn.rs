// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Exponential Synapse
//!
//! Single-exponential conductance synapse driven by incoming events.
//!
//! ## Model Dynamics
//!
//! ```text
//! On event with connection weight w:
//!     g ← g + w × gmax
//!
//! Between events:
//!     dg/dt = -g / tau
//!
//! Current (nA, conductance in µS):
//!     i = g × (V - e)
//! ```

use super::traits::{MechanismModel, ModelParameters};

/// Exponential synapse point process (`ExpSyn`)
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpSynModel;

impl ExpSynModel {
    pub fn new() -> Self {
        Self
    }

    /// Conductance after receiving one event
    #[inline]
    pub fn on_event(&self, g: f64, weight: f64, params: &ExpSynParameters) -> f64 {
        g + weight * params.gmax
    }

    /// Conductance after decaying for `dt` ms (exact solution)
    #[inline]
    pub fn decay(&self, g: f64, dt: f64, params: &ExpSynParameters) -> f64 {
        g * (-dt / params.tau).exp()
    }

    /// Synaptic current in nA
    #[inline]
    pub fn current(&self, g: f64, v: f64, params: &ExpSynParameters) -> f64 {
        g * (v - params.e)
    }
}

impl MechanismModel for ExpSynModel {
    type Parameters = ExpSynParameters;

    fn model_name(&self) -> &'static str {
        "Exponential synapse"
    }

    fn suffix(&self) -> &'static str {
        "ExpSyn"
    }
}

/// ExpSyn parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSynParameters {
    /// Decay time constant (ms)
    pub tau: f64,
    /// Reversal potential (mV)
    pub e: f64,
    /// Peak conductance per unit connection weight (µS)
    pub gmax: f64,
}

impl Default for ExpSynParameters {
    fn default() -> Self {
        Self {
            tau: 2.0,
            e: 0.0,
            gmax: 0.001,
        }
    }
}

impl ModelParameters for ExpSynParameters {
    const MECHANISM: &'static str = "ExpSyn";

    fn attribute_names() -> &'static [&'static str] {
        &["tau", "e", "gmax"]
    }

    fn slot(&self, attribute: &str) -> Option<&f64> {
        match attribute {
            "tau" => Some(&self.tau),
            "e" => Some(&self.e),
            "gmax" => Some(&self.gmax),
            _ => None,
        }
    }

    fn slot_mut(&mut self, attribute: &str) -> Option<&mut f64> {
        match attribute {
            "tau" => Some(&mut self.tau),
            "e" => Some(&mut self.e),
            "gmax" => Some(&mut self.gmax),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.tau.is_finite() || self.tau <= 0.0 {
            return Err("ExpSyn: tau must be finite and > 0");
        }
        if !self.gmax.is_finite() || self.gmax < 0.0 {
            return Err("ExpSyn: gmax must be finite and >= 0");
        }
        if !self.e.is_finite() {
            return Err("ExpSyn: reversal potential must be finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_increment_scales_with_gmax() {
        let model = ExpSynModel::new();
        let params = ExpSynParameters {
            gmax: 0.005,
            ..Default::default()
        };
        let g = model.on_event(0.0, 1.0, &params);
        assert!((g - 0.005).abs() < 1e-12);
        let g = model.on_event(g, 2.0, &params);
        assert!((g - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_decay_one_time_constant() {
        let model = ExpSynModel::new();
        let params = ExpSynParameters {
            tau: 14.0,
            ..Default::default()
        };
        let g = model.decay(1.0, 14.0, &params);
        assert!((g - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_current_sign() {
        let model = ExpSynModel::new();
        let params = ExpSynParameters::default();
        // Excitatory (e = 0 mV) current is negative (inward) at rest
        assert!(model.current(0.01, -70.0, &params) < 0.0);
    }

    #[test]
    fn test_parameter_validation() {
        let mut params = ExpSynParameters::default();
        assert_eq!(ExpSynParameters::parameter_count(), 3);
        assert!(params.set("tau", 0.0).is_err());
        assert_eq!(params.tau, 2.0);
        assert!(params.set("gmax", 0.01).is_ok());
        assert_eq!(params.get("gmax").unwrap(), 0.01);
    }
}
