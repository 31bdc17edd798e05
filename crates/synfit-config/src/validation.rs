// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every violation is collected and reported in one `ConfigError::ValidationError`.

use crate::{ConfigError, ConfigResult, SynfitConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - `simulation.dt` finite and positive
/// - `evaluation.max_score` positive
/// - `evaluation.invalid_fitness` finite and above `max_score`
/// - a known `logging.level`
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &SynfitConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_simulation(config, &mut errors);
    validate_evaluation(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_simulation(config: &SynfitConfig, errors: &mut Vec<ConfigValidationError>) {
    let simulation = &config.simulation;
    if !simulation.dt.is_finite() || simulation.dt <= 0.0 {
        errors.push(invalid("simulation.dt", "must be finite and positive"));
    }
    if !simulation.v_init.is_finite() {
        errors.push(invalid("simulation.v_init", "must be finite"));
    }
}

fn validate_evaluation(config: &SynfitConfig, errors: &mut Vec<ConfigValidationError>) {
    let evaluation = &config.evaluation;
    if evaluation.max_score.is_nan() || evaluation.max_score <= 0.0 {
        errors.push(invalid("evaluation.max_score", "must be positive"));
    }
    if !evaluation.invalid_fitness.is_finite() || evaluation.invalid_fitness <= evaluation.max_score {
        errors.push(invalid(
            "evaluation.invalid_fitness",
            "must be finite and greater than evaluation.max_score",
        ));
    }
}

fn validate_logging(config: &SynfitConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "logging.level",
            "must be one of trace, debug, info, warn, error",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SynfitConfig::default()).is_ok());
    }

    #[test]
    fn test_non_positive_dt() {
        let mut config = SynfitConfig::default();
        config.simulation.dt = 0.0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("simulation.dt")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fitness_must_exceed_max_score() {
        let mut config = SynfitConfig::default();
        config.evaluation.invalid_fitness = 100.0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("evaluation.invalid_fitness"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut config = SynfitConfig::default();
        config.simulation.dt = f64::NAN;
        config.evaluation.max_score = -1.0;
        config.logging.level = "verbose".to_string();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("simulation.dt"));
                assert!(msg.contains("evaluation.max_score"));
                assert!(msg.contains("logging.level"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = SynfitConfig::default();
        config.logging.level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
