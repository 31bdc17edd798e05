// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Objectives
//!
//! An objective turns one or more feature scores into one score. Lower is
//! better for every objective; the calculator sums them into the fitness.

use synfit_sim_neural::Responses;

use crate::error::{EvoError, EvoResult};
use crate::features::EFeature;

/// Default score of a feature that cannot be computed
pub const DEFAULT_MAX_SCORE: f64 = 250.0;

/// Scores a set of responses
pub trait Objective: Send {
    fn name(&self) -> &str;

    fn features(&self) -> &[EFeature];

    fn calculate_score(&self, responses: &Responses, max_score: f64) -> f64;
}

/// Score of a single feature
#[derive(Debug, Clone)]
pub struct SingletonObjective {
    name: String,
    feature: [EFeature; 1],
}

impl SingletonObjective {
    pub fn new(name: impl Into<String>, feature: EFeature) -> Self {
        Self {
            name: name.into(),
            feature: [feature],
        }
    }
}

impl Objective for SingletonObjective {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[EFeature] {
        &self.feature
    }

    fn calculate_score(&self, responses: &Responses, max_score: f64) -> f64 {
        self.feature[0].calculate_score(responses, max_score)
    }
}

/// Worst score among several features
#[derive(Debug, Clone)]
pub struct MaxObjective {
    name: String,
    features: Vec<EFeature>,
}

impl MaxObjective {
    pub fn new(name: impl Into<String>, features: Vec<EFeature>) -> EvoResult<Self> {
        let name = name.into();
        if features.is_empty() {
            return Err(EvoError::InvalidObjective(format!("{}: no features", name)));
        }
        Ok(Self { name, features })
    }
}

impl Objective for MaxObjective {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[EFeature] {
        &self.features
    }

    fn calculate_score(&self, responses: &Responses, max_score: f64) -> f64 {
        self.features
            .iter()
            .map(|f| f.calculate_score(responses, max_score))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Weighted sum of feature scores
#[derive(Debug, Clone)]
pub struct WeightedSumObjective {
    name: String,
    features: Vec<EFeature>,
    weights: Vec<f64>,
}

impl WeightedSumObjective {
    /// # Errors
    ///
    /// `InvalidObjective` if there are no features, the weight count differs,
    /// or a weight is negative or not finite.
    pub fn new(name: impl Into<String>, features: Vec<EFeature>, weights: Vec<f64>) -> EvoResult<Self> {
        let name = name.into();
        if features.is_empty() {
            return Err(EvoError::InvalidObjective(format!("{}: no features", name)));
        }
        if features.len() != weights.len() {
            return Err(EvoError::InvalidObjective(format!(
                "{}: {} features but {} weights",
                name,
                features.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EvoError::InvalidObjective(format!(
                "{}: weights must be finite and >= 0",
                name
            )));
        }
        Ok(Self {
            name,
            features,
            weights,
        })
    }
}

impl Objective for WeightedSumObjective {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[EFeature] {
        &self.features
    }

    fn calculate_score(&self, responses: &Responses, max_score: f64) -> f64 {
        self.features
            .iter()
            .zip(&self.weights)
            .map(|(f, w)| w * f.calculate_score(responses, max_score))
            .sum()
    }
}

/// All objectives of one evaluation, in declaration order
pub struct ObjectivesCalculator {
    objectives: Vec<Box<dyn Objective>>,
    max_score: f64,
}

impl std::fmt::Debug for ObjectivesCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectivesCalculator")
            .field("objectives", &self.objective_names())
            .field("max_score", &self.max_score)
            .finish()
    }
}

impl ObjectivesCalculator {
    pub fn new(objectives: Vec<Box<dyn Objective>>) -> Self {
        Self {
            objectives,
            max_score: DEFAULT_MAX_SCORE,
        }
    }

    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = max_score;
        self
    }

    pub fn set_max_score(&mut self, max_score: f64) {
        self.max_score = max_score;
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn objectives(&self) -> &[Box<dyn Objective>] {
        &self.objectives
    }

    pub fn objective_names(&self) -> Vec<String> {
        self.objectives.iter().map(|o| o.name().to_string()).collect()
    }

    /// Recordings any feature reads from
    pub fn required_recordings(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .objectives
            .iter()
            .flat_map(|o| o.features().iter().map(EFeature::recording))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Per-objective scores, in declaration order
    pub fn calculate_scores(&self, responses: &Responses) -> Vec<(String, f64)> {
        self.objectives
            .iter()
            .map(|o| (o.name().to_string(), o.calculate_score(responses, self.max_score)))
            .collect()
    }

    /// Sum of all objective scores
    pub fn calculate_fitness(&self, responses: &Responses) -> f64 {
        self.calculate_scores(responses).iter().map(|(_, s)| s).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureKind;
    use synfit_sim_neural::Trace;

    fn flat_responses(v: f64) -> Responses {
        let mut trace = Trace::default();
        for i in 0..=100 {
            trace.push(i as f64, v);
        }
        [("step.soma.v".to_string(), trace)].into_iter().collect()
    }

    fn vmax(exp_mean: f64) -> EFeature {
        EFeature::new(
            "vmax",
            FeatureKind::MaximumVoltage,
            "step.soma.v",
            (10.0, 90.0),
            exp_mean,
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn test_singleton() {
        let objective = SingletonObjective::new("vmax", vmax(-66.0));
        assert!((objective.calculate_score(&flat_responses(-70.0), 250.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_and_weighted_sum() {
        let r = flat_responses(-70.0);
        let max = MaxObjective::new("max", vec![vmax(-66.0), vmax(-60.0)]).unwrap();
        assert!((max.calculate_score(&r, 250.0) - 5.0).abs() < 1e-12);

        let sum = WeightedSumObjective::new("sum", vec![vmax(-66.0), vmax(-60.0)], vec![1.0, 0.5]).unwrap();
        assert!((sum.calculate_score(&r, 250.0) - 4.5).abs() < 1e-12);

        assert!(WeightedSumObjective::new("bad", vec![vmax(0.0)], vec![]).is_err());
        assert!(MaxObjective::new("empty", vec![]).is_err());
    }

    #[test]
    fn test_calculator_order_and_fitness() {
        let calculator = ObjectivesCalculator::new(vec![
            Box::new(SingletonObjective::new("b", vmax(-66.0))),
            Box::new(SingletonObjective::new("a", vmax(-70.0))),
        ]);
        let r = flat_responses(-70.0);
        let scores = calculator.calculate_scores(&r);
        assert_eq!(scores[0].0, "b");
        assert_eq!(scores[1].0, "a");
        assert!((calculator.calculate_fitness(&r) - 2.0).abs() < 1e-12);
        assert_eq!(calculator.required_recordings(), vec!["step.soma.v"]);
    }

    #[test]
    fn test_missing_response_uses_max_score() {
        let calculator = ObjectivesCalculator::new(vec![Box::new(SingletonObjective::new("vmax", vmax(-66.0)))])
            .with_max_score(40.0);
        assert_eq!(calculator.calculate_fitness(&Responses::new()), 40.0);
    }
}
