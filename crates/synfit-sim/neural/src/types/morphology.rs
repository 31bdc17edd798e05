// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Morphology description
//!
//! A morphology is read-only input to every instantiation: the same value is
//! shared by all evaluations of a circuit and never mutated by a simulator.
//! Loading morphologies from files is the caller's concern; this type only
//! describes the sections that result.

use serde::{Deserialize, Serialize};

/// Name of the implicit section list that contains every section
pub const ALL_SECTIONS: &str = "all";

/// One unbranched cable section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Section list this section belongs to (besides `all`)
    pub seclist: String,
    /// Length in µm
    pub length: f64,
    /// Diameter in µm
    pub diam: f64,
}

impl Section {
    /// Lateral membrane area in µm²
    pub fn area(&self) -> f64 {
        core::f64::consts::PI * self.diam * self.length
    }
}

/// Named collection of sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Morphology {
    pub name: String,
    pub sections: Vec<Section>,
}

impl Morphology {
    pub fn new(name: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            name: name.into(),
            sections,
        }
    }

    /// Single somatic compartment (`soma[0]` in the `somatic` list)
    pub fn single_compartment(name: impl Into<String>, length: f64, diam: f64) -> Self {
        Self::new(
            name,
            vec![Section {
                name: "soma[0]".to_string(),
                seclist: "somatic".to_string(),
                length,
                diam,
            }],
        )
    }

    /// Sections of a section list, in declaration order
    pub fn sections_in<'a>(&'a self, seclist: &'a str) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections
            .iter()
            .filter(move |s| seclist == ALL_SECTIONS || s.seclist == seclist)
    }

    /// Indices (into `sections`) of the sections of a section list
    pub fn section_indices<'a>(&'a self, seclist: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.sections
            .iter()
            .enumerate()
            .filter(move |(_, s)| seclist == ALL_SECTIONS || s.seclist == seclist)
            .map(|(i, _)| i)
    }

    /// Index (into `sections`) of the `sec_index`-th section of a section list
    pub fn section_index(&self, seclist: &str, sec_index: usize) -> Option<usize> {
        self.section_indices(seclist).nth(sec_index)
    }

    pub fn has_seclist(&self, seclist: &str) -> bool {
        self.sections_in(seclist).next().is_some()
    }
}
