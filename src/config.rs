//! Dashboard configuration.
//!
//! Every run is described by a [`DashboardConfig`]. Values are layered, later
//! layers winning:
//!
//! 1. built-in defaults (Oak Creek, discharge, last 7 days, `hydrograph.png`)
//! 2. a TOML file (`--config`, or `hydrograph.toml` in the working directory)
//! 3. `HYDROGRAPH_*` environment variables (a `.env` file is honoured)
//! 4. command-line flags, applied by the binary
//!
//! ```toml
//! site_code = "09504500"
//! parameter_code = "00060"
//! period = "P7D"
//! output_path = "hydrograph.png"
//! timeout_secs = 30
//!
//! [chart]
//! width = 1000
//! height = 600
//! line_color = "#1f77b4"
//! ```

use crate::ingest::usgs::{build_iv_url, USGS_IV_BASE_URL};
use crate::model::{HydroError, PARAM_DISCHARGE};
use crate::stations::{self, DEFAULT_SITE_CODE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up automatically when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "hydrograph.toml";

pub const ENV_SITE_CODE: &str = "HYDROGRAPH_SITE_CODE";
pub const ENV_PARAMETER_CODE: &str = "HYDROGRAPH_PARAMETER_CODE";
pub const ENV_PERIOD: &str = "HYDROGRAPH_PERIOD";
pub const ENV_OUTPUT: &str = "HYDROGRAPH_OUTPUT";
pub const ENV_BASE_URL: &str = "HYDROGRAPH_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "HYDROGRAPH_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// USGS site number of the gauge.
    pub site_code: String,
    /// USGS parameter code; `00060` is discharge.
    pub parameter_code: String,
    /// ISO-8601 look-back window, e.g. `P7D` or `PT12H`.
    pub period: String,
    /// IV service endpoint the query string is appended to.
    pub base_url: String,
    /// Where the chart image is written.
    pub output_path: PathBuf,
    /// Request timeout for the single fetch.
    pub timeout_secs: u64,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Overrides the generated "Real-Time Streamflow: ..." title.
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// `#rrggbb`
    pub line_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            site_code: DEFAULT_SITE_CODE.to_string(),
            parameter_code: PARAM_DISCHARGE.to_string(),
            period: "P7D".to_string(),
            base_url: USGS_IV_BASE_URL.to_string(),
            output_path: PathBuf::from("hydrograph.png"),
            timeout_secs: 30,
            chart: ChartConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 1000,
            height: 600,
            line_color: "#1f77b4".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, HydroError> {
        toml::from_str(text).map_err(|e| HydroError::Config(format!("invalid TOML: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, HydroError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HydroError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if given, else `hydrograph.toml` when it exists, else the
    /// defaults. An explicitly named file that is missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, HydroError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!(path = %fallback.display(), "loading default config file");
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Applies `HYDROGRAPH_*` overrides. `lookup` is normally
    /// `|k| std::env::var(k).ok()`; tests pass a map instead.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), HydroError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_SITE_CODE) {
            self.site_code = v;
        }
        if let Some(v) = lookup(ENV_PARAMETER_CODE) {
            self.parameter_code = v;
        }
        if let Some(v) = lookup(ENV_PERIOD) {
            self.period = v;
        }
        if let Some(v) = lookup(ENV_OUTPUT) {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = v.trim().parse().map_err(|_| {
                HydroError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, v))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), HydroError> {
        if !stations::is_valid_site_code(&self.site_code) {
            return Err(HydroError::Config(format!(
                "site_code must be 8-15 digits, got '{}'",
                self.site_code
            )));
        }
        if self.parameter_code.len() != 5 || !self.parameter_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(HydroError::Config(format!(
                "parameter_code must be 5 digits, got '{}'",
                self.parameter_code
            )));
        }
        if stations::find_station(&self.site_code).is_some()
            && !stations::station_has_parameter(&self.site_code, &self.parameter_code)
        {
            tracing::warn!(
                site = %self.site_code,
                parameter = %self.parameter_code,
                "station is not known to report this parameter; the response may be empty"
            );
        }
        if duration_parts(&self.period).is_none() {
            return Err(HydroError::Config(format!(
                "period must be an ISO-8601 duration such as P7D or PT12H, got '{}'",
                self.period
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HydroError::Config(format!("base_url must be http(s), got '{}'", self.base_url)));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(HydroError::Config("output_path must not be empty".to_string()));
        }
        let extension = self
            .output_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(extension.as_deref(), Some("png" | "jpg" | "jpeg" | "bmp")) {
            return Err(HydroError::Config(format!(
                "output_path must end in .png, .jpg or .bmp, got '{}'",
                self.output_path.display()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(HydroError::Config("timeout_secs must be positive".to_string()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(HydroError::Config(format!(
                "chart size must be positive, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }
        if parse_hex_color(&self.chart.line_color).is_none() {
            return Err(HydroError::Config(format!(
                "chart.line_color must look like #1f77b4, got '{}'",
                self.chart.line_color
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived values
    // -----------------------------------------------------------------------

    pub fn iv_url(&self) -> String {
        build_iv_url(&self.base_url, &self.site_code, &self.parameter_code, &self.period)
    }

    /// Human form of the period: `P7D` → `Last 7 Days`.
    pub fn period_label(&self) -> String {
        period_label(&self.period)
    }

    pub fn chart_title(&self) -> String {
        match &self.chart.title {
            Some(title) => title.clone(),
            None => format!(
                "Real-Time Streamflow: {} ({})",
                stations::display_name(&self.site_code),
                self.period_label()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ISO-8601 durations
// ---------------------------------------------------------------------------

/// Splits an ISO-8601 duration into `(count, unit)` pairs, or `None` when it
/// is not one. `P1DT12H` → `[(1, "Day"), (12, "Hour")]`.
fn duration_parts(period: &str) -> Option<Vec<(u64, &'static str)>> {
    let rest = period.strip_prefix('P')?;
    let mut parts = Vec::new();
    let mut in_time = false;
    let mut digits = String::new();

    for c in rest.chars() {
        match c {
            'T' if !in_time && digits.is_empty() => in_time = true,
            '0'..='9' => digits.push(c),
            _ => {
                let count: u64 = digits.parse().ok()?;
                digits.clear();
                let unit = match (in_time, c) {
                    (false, 'Y') => "Year",
                    (false, 'M') => "Month",
                    (false, 'W') => "Week",
                    (false, 'D') => "Day",
                    (true, 'H') => "Hour",
                    (true, 'M') => "Minute",
                    (true, 'S') => "Second",
                    _ => return None,
                };
                parts.push((count, unit));
            }
        }
    }

    if !digits.is_empty() || parts.is_empty() {
        return None;
    }
    Some(parts)
}

pub fn period_label(period: &str) -> String {
    match duration_parts(period) {
        Some(parts) => {
            let words: Vec<String> = parts
                .iter()
                .map(|(n, unit)| {
                    if *n == 1 {
                        format!("{} {}", n, unit)
                    } else {
                        format!("{} {}s", n, unit)
                    }
                })
                .collect();
            format!("Last {}", words.join(" "))
        }
        None => period.to_string(),
    }
}

/// Parses `#rrggbb` into its components.
pub fn parse_hex_color(text: &str) -> Option<(u8, u8, u8)> {
    let hex = text.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_reproduce_oak_creek_seven_day_query() {
        let config = DashboardConfig::default();
        config.validate().expect("defaults must validate");
        assert_eq!(
            config.iv_url(),
            "https://waterservices.usgs.gov/nwis/iv/?format=csv&sites=09504500&parameterCd=00060&period=P7D"
        );
        assert_eq!(config.output_path, PathBuf::from("hydrograph.png"));
        assert_eq!(config.chart_title(), "Real-Time Streamflow: Oak Creek, AZ (Last 7 Days)");
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_missing_fields() {
        let config = DashboardConfig::from_toml_str(
            r#"
            site_code = "05568500"
            period = "PT12H"

            [chart]
            width = 800
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.site_code, "05568500");
        assert_eq!(config.period, "PT12H");
        assert_eq!(config.parameter_code, "00060");
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 600);
        assert_eq!(config.chart_title(), "Real-Time Streamflow: USGS 05568500 (Last 12 Hours)");
    }

    #[test]
    fn test_unknown_toml_field_is_rejected() {
        let result = DashboardConfig::from_toml_str("site = \"09504500\"");
        assert!(matches!(result, Err(HydroError::Config(_))), "got {:?}", result);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let result = DashboardConfig::load(Some(Path::new("/nonexistent/hydrograph.toml")));
        assert!(matches!(result, Err(HydroError::Config(_))));
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_SITE_CODE, "05568500"),
            (ENV_PERIOD, "P1D"),
            (ENV_OUTPUT, "out/flow.png"),
            (ENV_TIMEOUT_SECS, "5"),
        ]);
        let mut config = DashboardConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .expect("overrides are valid");
        assert_eq!(config.site_code, "05568500");
        assert_eq!(config.period, "P1D");
        assert_eq!(config.output_path, PathBuf::from("out/flow.png"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.parameter_code, "00060", "unset variables leave values alone");
    }

    #[test]
    fn test_non_numeric_timeout_override_is_rejected() {
        let mut config = DashboardConfig::default();
        let result = config.apply_env(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert!(matches!(result, Err(HydroError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases: &[(&str, fn(&mut DashboardConfig))] = &[
            ("short site", |c: &mut DashboardConfig| c.site_code = "1234".into()),
            ("alpha param", |c: &mut DashboardConfig| c.parameter_code = "0006O".into()),
            ("bad period", |c: &mut DashboardConfig| c.period = "7 days".into()),
            ("empty period", |c: &mut DashboardConfig| c.period = "PT".into()),
            ("ftp url", |c: &mut DashboardConfig| c.base_url = "ftp://example.com".into()),
            ("svg output", |c: &mut DashboardConfig| c.output_path = "hydrograph.svg".into()),
            ("no extension", |c: &mut DashboardConfig| c.output_path = "hydrograph".into()),
            ("zero timeout", |c: &mut DashboardConfig| c.timeout_secs = 0),
            ("zero width", |c: &mut DashboardConfig| c.chart.width = 0),
            ("bad color", |c: &mut DashboardConfig| c.chart.line_color = "blue".into()),
        ];
        for (name, mutate) in cases {
            let mut config = DashboardConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(HydroError::Config(_))),
                "case '{}' should fail validation",
                name
            );
        }
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(period_label("P7D"), "Last 7 Days");
        assert_eq!(period_label("P1D"), "Last 1 Day");
        assert_eq!(period_label("PT12H"), "Last 12 Hours");
        assert_eq!(period_label("P1DT6H"), "Last 1 Day 6 Hours");
        assert_eq!(period_label("P2W"), "Last 2 Weeks");
        assert_eq!(period_label("whenever"), "whenever");
    }

    #[test]
    fn test_explicit_title_wins() {
        let mut config = DashboardConfig::default();
        config.chart.title = Some("My Creek".to_string());
        assert_eq!(config.chart_title(), "My Creek");
    }

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(parse_hex_color("#1f77b4"), Some((0x1f, 0x77, 0xb4)));
        assert_eq!(parse_hex_color("1f77b4"), None);
        assert_eq!(parse_hex_color("#1f77b"), None);
        assert_eq!(parse_hex_color("#zz77b4"), None);
    }
}
