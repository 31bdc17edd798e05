// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs one global `tracing` subscriber: a console layer, plus a combined
//! JSON log file when file output is requested and `file-logging` is enabled.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when it is dropped
#[derive(Debug)]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder of the log file, if file output is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize logging
///
/// The filter combines `config.level` with the per-crate debug flags. With
/// `LogOutput::File(dir)` a timestamped folder is created:
/// ```text
/// <dir>/
///   └── run_20250101_120000/
///       └── synfit.log (combined, JSON)
/// ```
/// and folders outside the retention policy are removed.
///
/// # Errors
///
/// Fails if the filter is invalid, the log folder cannot be created, file
/// output is requested without the `file-logging` feature, or a global
/// subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string_with_default(&config.level);
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let console_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };
    layers.push(console_layer);

    let guard = match &config.output {
        LogOutput::Stdout => LoggingGuard {
            #[cfg(feature = "file-logging")]
            _file_guards: Vec::new(),
            log_dir: None,
        },
        LogOutput::File(base_log_dir) => {
            add_file_layer(&mut layers, base_log_dir, &filter, config)?
        }
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn add_file_layer(
    layers: &mut Vec<BoxedLayer>,
    base_log_dir: &Path,
    filter: &str,
    config: &LoggingConfig,
) -> Result<LoggingGuard> {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(
        base_log_dir,
        config.retention_days,
        config.retention_runs,
        &run_folder,
    )?;

    let appender = tracing_appender::rolling::never(&run_folder, "synfit.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(EnvFilter::try_new(filter)?)
        .boxed();
    layers.push(file_layer);

    Ok(LoggingGuard {
        _file_guards: vec![guard],
        log_dir: Some(run_folder),
    })
}

#[cfg(not(feature = "file-logging"))]
fn add_file_layer(
    _layers: &mut Vec<BoxedLayer>,
    base_log_dir: &Path,
    _filter: &str,
    _config: &LoggingConfig,
) -> Result<LoggingGuard> {
    anyhow::bail!(
        "File logging to {} requires the `file-logging` feature",
        base_log_dir.display()
    )
}

/// Parse the timestamp of a `run_YYYYMMDD_HHMMSS` folder name
#[cfg_attr(not(feature = "file-logging"), allow(dead_code))]
fn run_timestamp(dir_name: &str) -> Option<DateTime<Utc>> {
    let timestamp = dir_name.strip_prefix("run_")?;
    NaiveDateTime::parse_from_str(timestamp, "%Y%m%d_%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`; `current` is never removed
#[cfg_attr(not(feature = "file-logging"), allow(dead_code))]
fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
    current: &Path,
) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() || path == current {
            continue;
        }
        if let Some(dt) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(run_timestamp)
        {
            runs.push((path, dt));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    // The current run counts against the retention limit
    let keep = retention_runs.saturating_sub(1);
    for (index, (path, dt)) in runs.iter().enumerate() {
        if *dt < cutoff_date || index >= keep {
            if let Err(e) = std::fs::remove_dir_all(path) {
                tracing::warn!(
                    target: "synfit-observability",
                    "Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}

/// Initialize console logging at `info` plus the given debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}
