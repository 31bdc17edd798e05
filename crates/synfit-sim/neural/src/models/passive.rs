// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Passive Membrane
//!
//! Leak current and the per-section cable properties it is integrated with.
//!
//! ```text
//! i_pas = g_pas × (V - e_pas)          [mA/cm²]
//! ```

use super::traits::{MechanismModel, ModelParameters};

/// Passive leak mechanism (`pas`)
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveModel;

impl PassiveModel {
    pub fn new() -> Self {
        Self
    }

    /// Leak current density in mA/cm²
    #[inline]
    pub fn current(&self, v: f64, params: &PassiveParameters) -> f64 {
        params.g * (v - params.e)
    }
}

impl MechanismModel for PassiveModel {
    type Parameters = PassiveParameters;

    fn model_name(&self) -> &'static str {
        "Passive leak"
    }

    fn suffix(&self) -> &'static str {
        "pas"
    }
}

/// Leak parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassiveParameters {
    /// Leak conductance density (S/cm²)
    pub g: f64,
    /// Leak reversal potential (mV)
    pub e: f64,
}

impl Default for PassiveParameters {
    fn default() -> Self {
        Self { g: 0.001, e: -70.0 }
    }
}

impl ModelParameters for PassiveParameters {
    const MECHANISM: &'static str = "pas";

    fn attribute_names() -> &'static [&'static str] {
        &["g_pas", "e_pas"]
    }

    fn slot(&self, attribute: &str) -> Option<&f64> {
        match attribute {
            "g_pas" | "g" => Some(&self.g),
            "e_pas" | "e" => Some(&self.e),
            _ => None,
        }
    }

    fn slot_mut(&mut self, attribute: &str) -> Option<&mut f64> {
        match attribute {
            "g_pas" | "g" => Some(&mut self.g),
            "e_pas" | "e" => Some(&mut self.e),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.g.is_finite() || self.g < 0.0 {
            return Err("pas: conductance must be finite and >= 0");
        }
        if !self.e.is_finite() {
            return Err("pas: reversal potential must be finite");
        }
        Ok(())
    }
}

/// Cable properties of one section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProperties {
    /// Specific membrane capacitance (µF/cm²)
    pub cm: f64,
    /// Axial resistivity (Ω·cm); carried for completeness, compartments are isopotential
    pub ra: f64,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self { cm: 1.0, ra: 35.4 }
    }
}

impl ModelParameters for SectionProperties {
    const MECHANISM: &'static str = "section";

    fn attribute_names() -> &'static [&'static str] {
        &["cm", "Ra"]
    }

    fn slot(&self, attribute: &str) -> Option<&f64> {
        match attribute {
            "cm" => Some(&self.cm),
            "Ra" => Some(&self.ra),
            _ => None,
        }
    }

    fn slot_mut(&mut self, attribute: &str) -> Option<&mut f64> {
        match attribute {
            "cm" => Some(&mut self.cm),
            "Ra" => Some(&mut self.ra),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.cm.is_finite() || self.cm <= 0.0 {
            return Err("section: cm must be finite and > 0");
        }
        if !self.ra.is_finite() || self.ra <= 0.0 {
            return Err("section: Ra must be finite and > 0");
        }
        Ok(())
    }
}
