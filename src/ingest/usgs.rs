//! USGS NWIS Instantaneous Values (IV) client.
//!
//! One unauthenticated GET per run, no retry. Only an HTTP 200 is accepted;
//! any other status ends the run with `HydroError::Fetch` before the body is
//! handed to the parser.
//!
//! API Documentation: https://waterservices.usgs.gov/docs/instantaneous-values/

use super::FlowSource;
use crate::model::HydroError;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

pub const USGS_IV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// Builds the IV query URL for one site, one parameter and a look-back
/// period such as `P7D`.
pub fn build_iv_url(base_url: &str, site_code: &str, parameter_code: &str, period: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}format=csv&sites={}&parameterCd={}&period={}",
        base_url, separator, site_code, parameter_code, period
    )
}

pub fn build_client(timeout: Duration) -> Result<Client, HydroError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HydroError::Transport(format!("could not build HTTP client: {}", e)))
}

/// Performs the GET and returns the body as UTF-8 text.
pub fn fetch_iv_text(client: &Client, url: &str) -> Result<String, HydroError> {
    tracing::debug!(url, "requesting IV data");

    let response = client
        .get(url)
        .send()
        .map_err(|e| HydroError::Transport(e.to_string()))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(HydroError::Fetch {
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .map_err(|e| HydroError::Transport(format!("failed to read response body: {}", e)))?;
    tracing::debug!(bytes = bytes.len(), "response received");

    String::from_utf8(bytes.to_vec())
        .map_err(|e| HydroError::Parse(format!("response is not valid UTF-8: {}", e)))
}

/// Live IV service as a [`FlowSource`].
pub struct UsgsSource {
    client: Client,
    url: String,
}

impl UsgsSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, HydroError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }
}

impl FlowSource for UsgsSource {
    fn describe(&self) -> String {
        "USGS API".to_string()
    }

    fn fetch_text(&self) -> Result<String, HydroError> {
        fetch_iv_text(&self.client, &self.url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
