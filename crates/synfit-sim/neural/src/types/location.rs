// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Locations on a morphology
//!
//! A location names *where* something is inserted; it carries no simulator state.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::error::{SimError, SimResult};

/// A whole named section list (e.g. `somatic`, `basal`, `all`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeclistLocation {
    pub name: String,
    pub seclist_name: String,
}

impl SeclistLocation {
    pub fn new(name: impl Into<String>, seclist_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seclist_name: seclist_name.into(),
        }
    }
}

impl fmt::Display for SeclistLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seclist_name)
    }
}

/// One compartment: section `sec_index` of a section list, at relative position `comp_x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompLocation {
    pub name: String,
    pub seclist_name: String,
    pub sec_index: usize,
    pub comp_x: f64,
}

impl CompLocation {
    /// Create a compartment location
    ///
    /// # Errors
    ///
    /// `SimError::InvalidLocation` if `comp_x` is not a finite value in `[0, 1]`.
    pub fn new(
        name: impl Into<String>,
        seclist_name: impl Into<String>,
        sec_index: usize,
        comp_x: f64,
    ) -> SimResult<Self> {
        let name = name.into();
        if !comp_x.is_finite() || !(0.0..=1.0).contains(&comp_x) {
            return Err(SimError::InvalidLocation(format!(
                "{}: comp_x must be within [0, 1], got {}",
                name, comp_x
            )));
        }
        Ok(Self {
            name,
            seclist_name: seclist_name.into(),
            sec_index,
            comp_x,
        })
    }
}

impl fmt::Display for CompLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]({})", self.seclist_name, self.sec_index, self.comp_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_location_bounds() {
        assert!(CompLocation::new("somacenter", "somatic", 0, 0.5).is_ok());
        assert!(CompLocation::new("edge", "somatic", 0, 1.0).is_ok());
        assert!(CompLocation::new("bad", "somatic", 0, 1.5).is_err());
        assert!(CompLocation::new("nan", "somatic", 0, f64::NAN).is_err());
    }

    #[test]
    fn test_display() {
        let loc = CompLocation::new("somacenter", "somatic", 0, 0.5).unwrap();
        assert_eq!(loc.to_string(), "somatic[0](0.5)");
        assert_eq!(SeclistLocation::new("somatic", "somatic").to_string(), "somatic");
    }
}
