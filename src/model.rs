//! Core data types for the streamflow hydrograph dashboard.
//!
//! This module defines the shared domain model imported by all other modules:
//! the observation table produced by the RDB parser, the summary statistics
//! derived from it, and the error type that every stage propagates.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// Column names assigned positionally to every parsed RDB table.
pub const COLUMN_NAMES: [&str; 6] = [
    "agency",
    "site",
    "datetime",
    "timezone",
    "flow_cfs",
    "quality_flag",
];

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single instantaneous measurement row from a USGS IV RDB response.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub agency: String,
    pub site: String,
    pub datetime: NaiveDateTime, // local time as reported, see `timezone`
    pub timezone: String,        // e.g. "MST"
    pub flow_cfs: Option<f64>,   // None when the cell was not numeric
    pub quality_flag: String,    // "P" = provisional, "A" = approved
}

/// All observations for one fetch, in the order the service returned them.
///
/// Rows are never reordered. The flow column may contain gaps where the
/// gauge reported a sentinel such as `Ice` or `Eqp`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// The fixed column names, in order.
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn last(&self) -> Option<&Observation> {
        self.rows.last()
    }

    /// The `flow_cfs` column, nulls included.
    pub fn flows(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(|r| r.flow_cfs)
    }

    /// `(datetime, flow)` pairs with nulls preserved, for plotting.
    pub fn series(&self) -> impl Iterator<Item = (NaiveDateTime, Option<f64>)> + '_ {
        self.rows.iter().map(|r| (r.datetime, r.flow_cfs))
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Summary statistics over the `flow_cfs` column of one table.
///
/// The aggregates are `None` when no row carries a numeric flow (a gauge
/// reporting only `Ice` for the whole period, for instance).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    /// Flow of the final row, even when that reading was invalid.
    pub current_cfs: Option<f64>,
    pub max_cfs: Option<f64>,
    pub min_cfs: Option<f64>,
    pub mean_cfs: Option<f64>,
    /// Rows in the table.
    pub observation_count: usize,
    /// Rows with a numeric flow value.
    pub valid_count: usize,
}

impl FlowSummary {
    /// The `(current, mean)` pair handed on to downstream consumers.
    pub fn headline(&self) -> (Option<f64>, Option<f64>) {
        (self.current_cfs, self.mean_cfs)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can end a dashboard run.
#[derive(Debug, thiserror::Error)]
pub enum HydroError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Non-200 HTTP response from the USGS API.
    #[error("Failed to fetch data: HTTP {status}")]
    Fetch { status: u16 },
    /// The request never produced a response (DNS, refused, timeout).
    #[error("Request failed: {0}")]
    Transport(String),
    /// The response body did not match the expected RDB layout.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Nothing to aggregate or plot.
    #[error("No data available: {0}")]
    EmptyData(String),
    /// Chart rendering failed.
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a failure, used to choose log severity and the
/// hint printed alongside the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Service-side or network trouble; a later run may succeed.
    Transient,
    /// The request or local configuration is wrong.
    Configuration,
    /// The service answered in a layout we do not understand.
    UpstreamSchema,
    /// The station returned no usable readings (offline, seasonal).
    NoData,
    /// Local rendering or filesystem failure.
    Local,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Transient => write!(f, "TRANSIENT"),
            FailureType::Configuration => write!(f, "CONFIGURATION"),
            FailureType::UpstreamSchema => write!(f, "UPSTREAM-SCHEMA"),
            FailureType::NoData => write!(f, "NO-DATA"),
            FailureType::Local => write!(f, "LOCAL"),
        }
    }
}

impl HydroError {
    /// Process exit code for this error kind. Success is 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            HydroError::Config(_) => 2,
            HydroError::Fetch { .. } | HydroError::Transport(_) => 3,
            HydroError::Parse(_) => 4,
            HydroError::EmptyData(_) => 5,
            HydroError::Chart(_) | HydroError::Io(_) => 6,
        }
    }

    pub fn failure_type(&self) -> FailureType {
        match self {
            HydroError::Fetch { status } if *status >= 500 => FailureType::Transient,
            HydroError::Fetch { .. } => FailureType::Configuration,
            HydroError::Transport(_) => FailureType::Transient,
            HydroError::Config(_) => FailureType::Configuration,
            HydroError::Parse(_) => FailureType::UpstreamSchema,
            HydroError::EmptyData(_) => FailureType::NoData,
            HydroError::Chart(_) | HydroError::Io(_) => FailureType::Local,
        }
    }
}
