//! hydrograph: real-time streamflow dashboard for a single USGS gauge.
//!
//! # Module structure
//!
//! ```text
//! hydrograph
//! ├── model        shared data types (Observation, ObservationTable, FlowSummary, HydroError)
//! ├── config       DashboardConfig: defaults, TOML file, HYDROGRAPH_* env overrides
//! ├── stations     known USGS sites and chart labels
//! ├── ingest
//! │   ├── usgs     USGS NWIS IV API: URL construction + the single fetch
//! │   └── rdb      tab-delimited RDB parsing into an ObservationTable
//! ├── dev_mode     replay a saved response instead of calling the API
//! ├── analysis
//! │   └── summary  current / max / min / mean flow and the console report
//! ├── chart        hydrograph PNG rendering
//! ├── pipeline     fetch → parse → analyze → plot, once
//! └── logging      tracing subscriber setup and failure classification
//! ```

pub mod analysis;
pub mod chart;
pub mod config;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod stations;
