// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # eFeatures
//!
//! Scalar summaries of one recorded trace, compared against an experimental
//! mean and standard deviation.
//!
//! ```text
//! score = |value - exp_mean| / exp_std
//! ```
//!
//! A feature that cannot be computed (missing trace, empty window) scores
//! `max_score`.

use serde::{Deserialize, Serialize};
use synfit_sim_neural::{Responses, Trace};

use crate::error::{EvoError, EvoResult};

/// Default spike detection threshold (mV)
pub const DEFAULT_THRESHOLD: f64 = -20.0;

/// Supported feature computations, named as in eFEL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    MaximumVoltage,
    MinimumVoltage,
    VoltageBase,
    SteadyStateVoltage,
    VoltageDeflection,
    SpikeCount,
}

impl FeatureKind {
    pub fn efel_name(&self) -> &'static str {
        match self {
            FeatureKind::MaximumVoltage => "maximum_voltage",
            FeatureKind::MinimumVoltage => "minimum_voltage",
            FeatureKind::VoltageBase => "voltage_base",
            FeatureKind::SteadyStateVoltage => "steady_state_voltage",
            FeatureKind::VoltageDeflection => "voltage_deflection",
            FeatureKind::SpikeCount => "Spikecount",
        }
    }

    pub fn from_efel_name(name: &str) -> Option<Self> {
        [
            FeatureKind::MaximumVoltage,
            FeatureKind::MinimumVoltage,
            FeatureKind::VoltageBase,
            FeatureKind::SteadyStateVoltage,
            FeatureKind::VoltageDeflection,
            FeatureKind::SpikeCount,
        ]
        .into_iter()
        .find(|kind| kind.efel_name() == name)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean of the samples before the stimulus
fn voltage_base(trace: &Trace, stim_start: f64) -> Option<f64> {
    mean(&trace.before(stim_start).collect::<Vec<_>>())
}

/// Mean of the last 10% of the stimulus window
fn steady_state_voltage(window: &[f64]) -> Option<f64> {
    let tail = ((window.len() as f64) * 0.1).ceil().max(1.0) as usize;
    mean(&window[window.len().saturating_sub(tail)..])
}

/// Upward crossings of `threshold`
fn spike_count(window: &[f64], threshold: f64) -> usize {
    window
        .windows(2)
        .filter(|pair| pair[0] < threshold && pair[1] >= threshold)
        .count()
}

/// One feature of one recording, with its experimental target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EFeature {
    name: String,
    kind: FeatureKind,
    recording: String,
    stim_start: f64,
    stim_end: f64,
    exp_mean: f64,
    exp_std: f64,
    threshold: f64,
}

impl EFeature {
    /// # Errors
    ///
    /// `InvalidObjective` if the window is empty or reversed, or `exp_std`
    /// is not a positive finite number.
    pub fn new(
        name: impl Into<String>,
        kind: FeatureKind,
        recording: impl Into<String>,
        stim_window: (f64, f64),
        exp_mean: f64,
        exp_std: f64,
    ) -> EvoResult<Self> {
        let name = name.into();
        let (stim_start, stim_end) = stim_window;
        if !(stim_start.is_finite() && stim_end.is_finite() && stim_start < stim_end) {
            return Err(EvoError::InvalidObjective(format!(
                "{}: stimulus window [{}, {}] is empty",
                name, stim_start, stim_end
            )));
        }
        if !exp_std.is_finite() || exp_std <= 0.0 || !exp_mean.is_finite() {
            return Err(EvoError::InvalidObjective(format!(
                "{}: needs a finite mean and a positive std, got {} ± {}",
                name, exp_mean, exp_std
            )));
        }
        Ok(Self {
            name,
            kind,
            recording: recording.into(),
            stim_start,
            stim_end,
            exp_mean,
            exp_std,
            threshold: DEFAULT_THRESHOLD,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Response the feature is computed from
    pub fn recording(&self) -> &str {
        &self.recording
    }

    pub fn exp_mean(&self) -> f64 {
        self.exp_mean
    }

    pub fn exp_std(&self) -> f64 {
        self.exp_std
    }

    /// Feature value, or `None` if it cannot be computed from `responses`
    pub fn calculate_feature(&self, responses: &Responses) -> Option<f64> {
        let trace = responses.get(&self.recording)?;
        let window: Vec<f64> = trace.window(self.stim_start, self.stim_end).collect();
        if window.is_empty() {
            return None;
        }

        let value = match self.kind {
            FeatureKind::MaximumVoltage => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            FeatureKind::MinimumVoltage => window.iter().copied().fold(f64::INFINITY, f64::min),
            FeatureKind::VoltageBase => voltage_base(trace, self.stim_start)?,
            FeatureKind::SteadyStateVoltage => steady_state_voltage(&window)?,
            FeatureKind::VoltageDeflection => {
                steady_state_voltage(&window)? - voltage_base(trace, self.stim_start)?
            }
            FeatureKind::SpikeCount => spike_count(&window, self.threshold) as f64,
        };
        value.is_finite().then_some(value)
    }

    /// Distance to the experimental value in units of its std
    pub fn calculate_score(&self, responses: &Responses, max_score: f64) -> f64 {
        match self.calculate_feature(responses) {
            Some(value) => (value - self.exp_mean).abs() / self.exp_std,
            None => max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// -70 mV until 10 ms, then a triangle up to -10 mV and back by 20 ms
    fn responses() -> Responses {
        let mut trace = Trace::default();
        for i in 0..=300 {
            let t = i as f64 * 0.1;
            let v = if (10.0..20.0).contains(&t) {
                -70.0 + 60.0 * (1.0 - (t - 15.0).abs() / 5.0)
            } else {
                -70.0
            };
            trace.push(t, v);
        }
        [("step.soma.v".to_string(), trace)].into_iter().collect()
    }

    fn feature(kind: FeatureKind, window: (f64, f64)) -> EFeature {
        EFeature::new(kind.efel_name(), kind, "step.soma.v", window, 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_voltage_extremes() {
        let r = responses();
        let max = feature(FeatureKind::MaximumVoltage, (10.0, 30.0)).calculate_feature(&r);
        assert!((max.unwrap() - -10.0).abs() < 1e-9);
        let min = feature(FeatureKind::MinimumVoltage, (10.0, 30.0)).calculate_feature(&r);
        assert_eq!(min, Some(-70.0));
    }

    #[test]
    fn test_base_and_deflection() {
        let r = responses();
        assert_eq!(feature(FeatureKind::VoltageBase, (10.0, 30.0)).calculate_feature(&r), Some(-70.0));
        let deflection = feature(FeatureKind::VoltageDeflection, (10.0, 16.0))
            .calculate_feature(&r)
            .unwrap();
        assert!(deflection > 0.0);
    }

    #[test]
    fn test_spike_count() {
        let r = responses();
        assert_eq!(feature(FeatureKind::SpikeCount, (0.0, 30.0)).calculate_feature(&r), Some(1.0));
        let high = feature(FeatureKind::SpikeCount, (0.0, 30.0)).with_threshold(0.0);
        assert_eq!(high.calculate_feature(&r), Some(0.0));
    }

    #[test]
    fn test_missing_values_score_max() {
        let r = responses();
        let outside = feature(FeatureKind::MaximumVoltage, (100.0, 200.0));
        assert_eq!(outside.calculate_feature(&r), None);
        assert_eq!(outside.calculate_score(&r, 250.0), 250.0);

        let unknown = EFeature::new("f", FeatureKind::MaximumVoltage, "other.v", (0.0, 1.0), 0.0, 1.0).unwrap();
        assert_eq!(unknown.calculate_score(&r, 250.0), 250.0);
    }

    #[test]
    fn test_score_in_std_units() {
        let r = responses();
        let f = EFeature::new("vmax", FeatureKind::MaximumVoltage, "step.soma.v", (10.0, 30.0), -20.0, 5.0).unwrap();
        assert!((f.calculate_score(&r, 250.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(EFeature::new("f", FeatureKind::SpikeCount, "r", (5.0, 5.0), 0.0, 1.0).is_err());
        assert!(EFeature::new("f", FeatureKind::SpikeCount, "r", (0.0, 5.0), 0.0, 0.0).is_err());
        assert_eq!(FeatureKind::from_efel_name("Spikecount"), Some(FeatureKind::SpikeCount));
        assert_eq!(FeatureKind::from_efel_name("AP_width"), None);
    }
}
