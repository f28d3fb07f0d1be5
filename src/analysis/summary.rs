//! Flow summary statistics.
//!
//! Aggregates skip null flows; "current" is the last row as-is, so a gauge
//! whose latest reading was `Ice` reports no current flow even when earlier
//! readings were fine. A table whose every flow is null still summarizes,
//! with all statistics reported as `n/a`.

use crate::model::{FlowSummary, HydroError, ObservationTable};

/// Computes the summary for `table`.
///
/// Fails with `HydroError::EmptyData` only when the table has no rows.
pub fn summarize(table: &ObservationTable) -> Result<FlowSummary, HydroError> {
    let last = table
        .last()
        .ok_or_else(|| HydroError::EmptyData("observation table has no rows".to_string()))?;

    let valid: Vec<f64> = table.flows().flatten().collect();
    if valid.is_empty() {
        tracing::warn!(rows = table.len(), "no numeric flow values in the table");
    }

    let max_cfs = valid.iter().copied().reduce(f64::max);
    let min_cfs = valid.iter().copied().reduce(f64::min);
    let mean_cfs = (!valid.is_empty()).then(|| valid.iter().sum::<f64>() / valid.len() as f64);

    Ok(FlowSummary {
        current_cfs: last.flow_cfs,
        max_cfs,
        min_cfs,
        mean_cfs,
        observation_count: table.len(),
        valid_count: valid.len(),
    })
}

/// Renders the console report block.
pub fn format_report(summary: &FlowSummary, period_label: &str) -> String {
    format!(
        "📊 --- STATS FOR {} ---\n\
         Current Flow: {} cfs\n\
         Max Flow:     {} cfs\n\
         Min Flow:     {} cfs\n\
         Average Flow: {} cfs",
        period_label.to_uppercase(),
        or_na(summary.current_cfs, format_cfs),
        or_na(summary.max_cfs, format_cfs),
        or_na(summary.min_cfs, format_cfs),
        or_na(summary.mean_cfs, |v| format!("{:.2}", v)),
    )
}

fn or_na(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "n/a".to_string())
}

/// Formats a reading the way gauges report them: plain decimal, always with
/// a fractional part (`30.0`, `0.25`), never in exponent form.
fn format_cfs(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
