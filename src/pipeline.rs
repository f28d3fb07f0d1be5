//! The fetch → parse → analyze → plot sequence for one run.

use crate::analysis::summary::{format_report, summarize};
use crate::chart::{ChartSpec, render_hydrograph};
use crate::config::DashboardConfig;
use crate::ingest::FlowSource;
use crate::ingest::rdb::parse_rdb;
use crate::model::{FlowSummary, HydroError};
use crate::stations;
use serde::Serialize;
use std::path::PathBuf;

/// How progress and statistics reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Progress lines and the stats block on stdout.
    Human,
    /// Stdout is reserved for the JSON report; progress goes to the log.
    Json,
}

impl Output {
    fn say(self, message: &str) {
        match self {
            Output::Human => println!("{}", message),
            Output::Json => tracing::info!("{}", message.trim()),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub site_code: String,
    /// Official USGS name, for registered stations.
    pub station_name: Option<String>,
    pub parameter_code: String,
    pub period: String,
    pub source: String,
    /// Latest reading, the value downstream consumers act on.
    pub current_cfs: Option<f64>,
    pub mean_cfs: Option<f64>,
    pub summary: FlowSummary,
    pub chart_path: PathBuf,
}

/// Runs every stage once, in order. The first failing stage ends the run;
/// nothing after it executes and no partial output is written.
pub fn run(
    config: &DashboardConfig,
    source: &dyn FlowSource,
    output: Output,
) -> Result<RunReport, HydroError> {
    let spec = ChartSpec::from_config(config)?;

    output.say(&format!("🌊 Connecting to {}...", source.describe()));
    let text = source.fetch_text()?;
    output.say("✅ Data received successfully!");

    let station_name = stations::find_station(&config.site_code).map(|s| s.name.to_string());
    let table = parse_rdb(&text)?;
    tracing::info!(
        site = %config.site_code,
        station = station_name.as_deref().unwrap_or("unregistered"),
        rows = table.len(),
        "parsed observations"
    );

    let summary = summarize(&table)?;
    match output {
        Output::Human => println!("\n{}", format_report(&summary, &config.period_label())),
        Output::Json => tracing::info!(
            current = ?summary.current_cfs,
            max = ?summary.max_cfs,
            min = ?summary.min_cfs,
            mean = ?summary.mean_cfs,
            "flow summary"
        ),
    }

    output.say("\n🎨 Generating Hydrograph...");
    let chart_path = render_hydrograph(&table, &spec, &config.output_path)?;
    output.say(&format!("💾 Plot saved as '{}'", chart_path.display()));

    let (current_cfs, mean_cfs) = summary.headline();
    Ok(RunReport {
        site_code: config.site_code.clone(),
        station_name,
        parameter_code: config.parameter_code.clone(),
        period: config.period.clone(),
        source: source.describe(),
        current_cfs,
        mean_cfs,
        summary,
        chart_path,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
