//! Data ingestion for the hydrograph dashboard.
//!
//! Submodules:
//! - `usgs`: USGS NWIS IV API: URL construction and the single blocking fetch.
//! - `rdb`: parses the tab-delimited RDB body into an `ObservationTable`.
//!
//! Both the live API and the offline replay (`dev_mode`) implement
//! [`FlowSource`], which is all the pipeline sees.

pub mod rdb;
pub mod usgs;

use crate::model::HydroError;

/// Something that can produce the raw RDB text for one run.
pub trait FlowSource {
    /// Short description for progress messages and logs.
    fn describe(&self) -> String;

    /// Returns the decoded response body. Called at most once per run.
    fn fetch_text(&self) -> Result<String, HydroError>;
}
