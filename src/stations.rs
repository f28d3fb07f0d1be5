//! Station registry for the hydrograph dashboard.
//!
//! Holds metadata for gauge sites the dashboard knows by name, so that the
//! chart title can read "Oak Creek, AZ" rather than a bare site code. Sites
//! missing from the registry still work; they are labelled by code.

use crate::model::PARAM_DISCHARGE;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single USGS gauge station.
pub struct Station {
    /// USGS site code (8 to 15 digits).
    pub site_code: &'static str,
    /// Official USGS site name.
    pub name: &'static str,
    /// Short label used in chart titles.
    pub short_name: &'static str,
    /// Which parameters this station is expected to provide.
    pub expected_parameters: &'static [&'static str],
}

/// Site the dashboard reports on when nothing else is configured.
pub const DEFAULT_SITE_CODE: &str = "09504500";

/// Known stations.
///
/// Sources:
///   - Site codes: USGS NWIS (waterservices.usgs.gov)
pub static STATION_REGISTRY: &[Station] = &[Station {
    site_code: "09504500",
    name: "Oak Creek near Cornville, AZ",
    short_name: "Oak Creek, AZ",
    expected_parameters: &[PARAM_DISCHARGE],
}];

/// Looks up a station by site code. Returns `None` if not found.
pub fn find_station(site_code: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.site_code == site_code)
}

/// Label for chart titles: the registry's short name, or `USGS <code>`.
pub fn display_name(site_code: &str) -> String {
    find_station(site_code)
        .map(|s| s.short_name.to_string())
        .unwrap_or_else(|| format!("USGS {}", site_code))
}

/// Returns `true` if `site_code` is registered and lists `param_code` among
/// its expected parameters.
pub fn station_has_parameter(site_code: &str, param_code: &str) -> bool {
    find_station(site_code)
        .map(|s| s.expected_parameters.contains(&param_code))
        .unwrap_or(false)
}

/// Returns `true` if `code` has the shape of a USGS site number.
pub fn is_valid_site_code(code: &str) -> bool {
    (8..=15).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
