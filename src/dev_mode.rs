//! Development mode: replay a saved RDB response instead of calling USGS.
//!
//! When the live service is unreachable (offline work, demos, CI), save a
//! response once with `curl ... > oak_creek.rdb` and pass `--replay
//! oak_creek.rdb`. The file goes through exactly the same parser, analysis
//! and chart code as a live fetch.

use crate::ingest::FlowSource;
use crate::model::HydroError;
use std::path::PathBuf;

/// A saved IV response on disk.
pub struct ReplaySource {
    path: PathBuf,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FlowSource for ReplaySource {
    fn describe(&self) -> String {
        format!("replay file {}", self.path.display())
    }

    fn fetch_text(&self) -> Result<String, HydroError> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            HydroError::Config(format!("cannot read replay file {}: {}", self.path.display(), e))
        })
    }
}
