//! Hydrograph rendering.
//!
//! Draws flow against time as a line chart with plotters' bitmap backend.
//! The image is rendered to a temporary file beside the destination and then
//! renamed over it, so an interrupted run never leaves a half-written chart
//! in place of the previous one.

use crate::config::{DashboardConfig, parse_hex_color};
use crate::model::{HydroError, ObservationTable};
use chrono::{Duration, NaiveDateTime};
use plotters::coord::Shift;
use plotters::coord::types::RangedDateTime;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A run of consecutive non-null readings. Null flows split the line.
type Segment = Vec<(NaiveDateTime, f64)>;

/// Fixed presentation of the hydrograph.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub line_color: RGBColor,
}

impl ChartSpec {
    pub fn from_config(config: &DashboardConfig) -> Result<Self, HydroError> {
        let (r, g, b) = parse_hex_color(&config.chart.line_color).ok_or_else(|| {
            HydroError::Config(format!("invalid chart.line_color '{}'", config.chart.line_color))
        })?;
        Ok(Self {
            title: config.chart_title(),
            x_label: "Date & Time".to_string(),
            y_label: "Discharge (ft³/s)".to_string(),
            width: config.chart.width,
            height: config.chart.height,
            line_color: RGBColor(r, g, b),
        })
    }
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            title: "Real-Time Streamflow: Oak Creek, AZ (Last 7 Days)".to_string(),
            x_label: "Date & Time".to_string(),
            y_label: "Discharge (ft³/s)".to_string(),
            width: 1000,
            height: 600,
            line_color: RGBColor(0x1f, 0x77, 0xb4),
        }
    }
}

/// Renders `table` to `path`, replacing any existing file, and returns the
/// path written. Rows whose flows are all null still get a chart with axes
/// and no line; only a table with no rows is `HydroError::EmptyData`.
pub fn render_hydrograph(
    table: &ObservationTable,
    spec: &ChartSpec,
    path: &Path,
) -> Result<PathBuf, HydroError> {
    let segments = flow_segments(table);
    let (x_range, y_range) = axis_ranges(table, &segments).ok_or_else(|| {
        HydroError::EmptyData("no observations to plot".to_string())
    })?;
    if segments.is_empty() {
        tracing::warn!(rows = table.len(), "no numeric flow values; drawing an empty hydrograph");
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    // The bitmap encoder is chosen from the extension, so the temp file keeps it.
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    let tmp = tempfile::Builder::new()
        .prefix(".hydrograph-")
        .suffix(&format!(".{}", extension))
        .tempfile_in(&dir)?
        .into_temp_path();

    let with_text = fonts_available();
    if !with_text {
        tracing::warn!("no usable system font found; rendering hydrograph without text");
    }

    {
        let root = BitMapBackend::new(&*tmp, (spec.width, spec.height)).into_drawing_area();
        draw(&root, spec, &segments, x_range, y_range, with_text)
            .map_err(|e| HydroError::Chart(e.to_string()))?;
    }

    tmp.persist(path).map_err(|e| HydroError::Io(e.error))?;
    tracing::debug!(path = %path.display(), points = segments.iter().map(Vec::len).sum::<usize>(), "hydrograph written");
    Ok(path.to_path_buf())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    segments: &[Segment],
    x_range: Range<NaiveDateTime>,
    y_range: Range<f64>,
    with_text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let line_style = spec.line_color.stroke_width(2);

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if with_text {
        builder
            .caption(spec.title.as_str(), ("sans-serif", 28))
            .x_label_area_size(110)
            .y_label_area_size(90);
    }
    let mut chart = builder.build_cartesian_2d(RangedDateTime::from(x_range), y_range)?;

    if with_text {
        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_labels(12)
            .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%m-%d %H:%M").to_string())
            .x_label_style(
                TextStyle::from(("sans-serif", 14).into_font()).transform(FontTransform::Rotate90),
            )
            .light_line_style(BLACK.mix(0.08))
            .bold_line_style(BLACK.mix(0.25))
            .draw()?;
    }

    let mut labelled = false;
    for segment in segments {
        // A lone reading between gaps has no line to draw; mark it instead.
        if segment.len() == 1 {
            chart.draw_series(std::iter::once(Circle::new(
                segment[0],
                3,
                spec.line_color.filled(),
            )))?;
            continue;
        }
        let drawn = chart.draw_series(LineSeries::new(segment.iter().copied(), line_style))?;
        if !labelled {
            drawn
                .label("Streamflow")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
            labelled = true;
        }
    }

    if with_text && labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.4))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn fonts_available() -> bool {
    ("sans-serif", 12).into_font().box_size("0").is_ok()
}

fn flow_segments(table: &ObservationTable) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = Segment::new();
    for (datetime, flow) in table.series() {
        match flow {
            Some(value) => current.push((datetime, value)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Y extent used when no reading is numeric.
const EMPTY_Y_RANGE: Range<f64> = 0.0..1.0;

/// Axis extents, or `None` for a table with no rows.
///
/// The x axis spans every row's timestamp, null flows included, so an
/// all-null table still gets a time axis. The y axis covers the plotted
/// points with 10% padding, or [`EMPTY_Y_RANGE`] when there are none.
/// Degenerate ranges are widened (one hour either side on x, one cfs on y)
/// so a single reading still plots.
fn axis_ranges(
    table: &ObservationTable,
    segments: &[Segment],
) -> Option<(Range<NaiveDateTime>, Range<f64>)> {
    let mut times = table.series().map(|(t, _)| t);
    let first = times.next()?;
    let (mut t0, mut t1) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    if t0 == t1 {
        t0 -= Duration::hours(1);
        t1 += Duration::hours(1);
    }

    let mut values = segments.iter().flatten().map(|&(_, v)| v);
    let y_range = match values.next() {
        Some(v) => {
            let (lo, hi) = values.fold((v, v), |(lo, hi), v| (lo.min(v), hi.max(v)));
            let pad = if hi - lo > 1e-9 { (hi - lo) * 0.1 } else { 1.0 };
            (lo - pad)..(hi + pad)
        }
        None => EMPTY_Y_RANGE,
    };

    Some((t0..t1, y_range))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
