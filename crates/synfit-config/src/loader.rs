// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, SynfitConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "synfit_configuration.toml";

/// Find the synfit configuration file
///
/// Search order:
/// 1. `SYNFIT_CONFIG_PATH` environment variable
/// 2. Current working directory: `./synfit_configuration.toml`
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SYNFIT_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SYNFIT_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SYNFIT_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load, override and validate the configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SynfitConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SynfitConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SYNFIT_DT` -> `simulation.dt`
/// - `SYNFIT_V_INIT` -> `simulation.v_init`
/// - `SYNFIT_CELSIUS` -> `simulation.celsius`
/// - `SYNFIT_MAX_SCORE` -> `evaluation.max_score`
/// - `SYNFIT_INVALID_FITNESS` -> `evaluation.invalid_fitness`
/// - `SYNFIT_KEEP_RESPONSES` -> `evaluation.keep_responses`
/// - `SYNFIT_WORKERS` -> `evaluation.workers`
/// - `SYNFIT_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut SynfitConfig) {
    let float = |name: &str| env::var(name).ok().and_then(|v| v.parse::<f64>().ok());

    if let Some(value) = float("SYNFIT_DT") {
        config.simulation.dt = value;
    }
    if let Some(value) = float("SYNFIT_V_INIT") {
        config.simulation.v_init = value;
    }
    if let Some(value) = float("SYNFIT_CELSIUS") {
        config.simulation.celsius = value;
    }
    if let Some(value) = float("SYNFIT_MAX_SCORE") {
        config.evaluation.max_score = value;
    }
    if let Some(value) = float("SYNFIT_INVALID_FITNESS") {
        config.evaluation.invalid_fitness = value;
    }
    if let Ok(value) = env::var("SYNFIT_KEEP_RESPONSES") {
        config.evaluation.keep_responses = parse_bool(&value);
    }
    if let Ok(value) = env::var("SYNFIT_WORKERS") {
        if let Ok(workers) = value.parse::<usize>() {
            config.evaluation.workers = workers;
        }
    }
    if let Ok(value) = env::var("SYNFIT_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"dt": "0.01", "max_score": "100"}`)
pub fn apply_cli_overrides(config: &mut SynfitConfig, cli_args: &HashMap<String, String>) {
    let float = |name: &str| cli_args.get(name).and_then(|v| v.parse::<f64>().ok());

    if let Some(value) = float("dt") {
        config.simulation.dt = value;
    }
    if let Some(value) = float("v_init") {
        config.simulation.v_init = value;
    }
    if let Some(value) = float("max_score") {
        config.evaluation.max_score = value;
    }
    if let Some(value) = cli_args.get("keep_responses") {
        config.evaluation.keep_responses = parse_bool(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
