// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `synfit_configuration.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynfitConfig {
    pub simulation: SimulationConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

/// Numerical settings forwarded to every simulation run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration step (ms)
    pub dt: f64,
    /// Initial membrane potential (mV)
    pub v_init: f64,
    /// Temperature (°C)
    pub celsius: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.025,
            v_init: -65.0,
            celsius: 34.0,
        }
    }
}

/// Scoring and evaluation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Score given to a feature that cannot be computed
    pub max_score: f64,
    /// Scalar handed to the optimizer for a failed evaluation
    pub invalid_fitness: f64,
    /// Keep recorded traces in every evaluation result
    pub keep_responses: bool,
    /// Parallel evaluation workers (0 = one per core)
    pub workers: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_score: 250.0,
            invalid_fitness: 1.0e9,
            keep_responses: false,
            workers: 0,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: SynfitConfig = serde_json::from_str(r#"{"evaluation": {"max_score": 50.0}}"#).unwrap();
        assert_eq!(config.evaluation.max_score, 50.0);
        assert_eq!(config.evaluation.invalid_fitness, 1.0e9);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_log_format_is_lowercase() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }
}
