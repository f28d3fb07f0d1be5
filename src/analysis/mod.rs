//! Statistics over parsed observation tables.
//!
//! Submodules:
//! - `summary`: current/max/min/mean flow and the printed report.

pub mod summary;
