// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recorded traces

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recordings of one run, keyed by recording name (e.g. `soma.v`)
pub type Responses = BTreeMap<String, Trace>;

/// Time/value samples of one recorded variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Sample times in ms
    pub time: Vec<f64>,
    /// Sampled values (mV for `v`)
    pub voltage: Vec<f64>,
}

impl Trace {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            voltage: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, t: f64, v: f64) {
        self.time.push(t);
        self.voltage.push(v);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Values sampled at times within `[start, end]`
    pub fn window(&self, start: f64, end: f64) -> impl Iterator<Item = f64> + '_ {
        self.time
            .iter()
            .zip(self.voltage.iter())
            .filter(move |(t, _)| **t >= start && **t <= end)
            .map(|(_, v)| *v)
    }

    /// Values sampled strictly before `t`
    pub fn before(&self, t: f64) -> impl Iterator<Item = f64> + '_ {
        self.time
            .iter()
            .zip(self.voltage.iter())
            .filter(move |(ti, _)| **ti < t)
            .map(|(_, v)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        let mut trace = Trace::default();
        for i in 0..10 {
            trace.push(i as f64, -70.0 + i as f64);
        }
        let window: Vec<f64> = trace.window(2.0, 4.0).collect();
        assert_eq!(window, vec![-68.0, -67.0, -66.0]);
        assert_eq!(trace.before(2.0).count(), 2);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut trace = Trace::default();
        trace.push(0.0, -65.0);
        let json = serde_json::to_value(&trace).unwrap();
        assert!(json.get("time").is_some());
        assert!(json.get("voltage").is_some());
    }
}
