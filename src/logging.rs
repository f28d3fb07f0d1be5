//! Structured logging for the hydrograph dashboard
//!
//! Diagnostics go through `tracing`. The console layer writes to stderr so
//! stdout stays free for the report (or the JSON summary); an optional file
//! layer appends plain-text entries for scheduled runs. `RUST_LOG`, when
//! set, overrides the configured level.

use crate::model::{FailureType, HydroError};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}' (debug, info, warn, error)", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Initialisation
// ---------------------------------------------------------------------------

/// Installs the global subscriber. Call once, before the pipeline runs.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Result<(), HydroError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));

    let console_timed = console_timestamps.then(|| {
        tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });
    let console_plain = (!console_timestamps).then(|| {
        tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_timed)
        .with(console_plain)
        .with(file_layer)
        .try_init()
        .map_err(|e| HydroError::Config(format!("logger already initialised: {}", e)))
}

// ---------------------------------------------------------------------------
// Failure Logging
// ---------------------------------------------------------------------------

/// One-line advice shown under the error message.
pub fn failure_hint(failure_type: FailureType) -> &'static str {
    match failure_type {
        FailureType::Transient => "the USGS service or network is unavailable; try again later",
        FailureType::Configuration => "check the site code, parameter code and period",
        FailureType::UpstreamSchema => "the service returned an unexpected layout; save the response and inspect it",
        FailureType::NoData => "the station reported no usable readings for this period",
        FailureType::Local => "check that the output directory exists and is writable",
    }
}

/// Logs a failed run at a severity matching its classification.
pub fn log_failure(operation: &str, err: &HydroError) {
    let failure_type = err.failure_type();
    match failure_type {
        FailureType::Transient | FailureType::NoData => {
            tracing::warn!(%failure_type, exit_code = err.exit_code(), "{} failed: {}", operation, err)
        }
        _ => tracing::error!(%failure_type, exit_code = err.exit_code(), "{} failed: {}", operation, err),
    }
}
