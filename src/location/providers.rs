//! Location providers: the OneMap search API and the lookup trait they share.

use super::types::{AddressRecord, LocationError, LocationSource, PostalCode};
use serde::Deserialize;
use std::time::Duration;

/// Public OneMap elastic search endpoint.
pub const ONEMAP_SEARCH_URL: &str = "https://www.onemap.gov.sg/api/common/elastic/search";

const USER_AGENT: &str = concat!("floodrisk/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a postal code into address rows.
///
/// An empty vector means the provider answered but knows no such code.
pub trait AddressLookup: Send + Sync {
    fn search(&self, code: &PostalCode) -> Result<Vec<AddressRecord>, LocationError>;

    fn source(&self) -> LocationSource;
}

// ─── OneMap ──────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct OneMapResponse {
    #[serde(default)]
    found: u32,
    #[serde(default)]
    results: Vec<AddressRecord>,
}

/// Blocking client for the OneMap search API.
pub struct OneMapClient {
    agent: ureq::Agent,
    base_url: String,
}

impl OneMapClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AddressLookup for OneMapClient {
    fn search(&self, code: &PostalCode) -> Result<Vec<AddressRecord>, LocationError> {
        let response = self
            .agent
            .get(&self.base_url)
            .query("searchVal", code.as_str())
            .query("returnGeom", "Y")
            .query("getAddrDetails", "Y")
            .query("pageNum", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => {
                    LocationError::Lookup(format!("OneMap returned HTTP {}", status))
                }
                ureq::Error::Transport(t) => LocationError::Lookup(t.to_string()),
            })?;

        let body: OneMapResponse = response
            .into_json()
            .map_err(|e| LocationError::Lookup(format!("invalid OneMap response: {}", e)))?;

        tracing::debug!(postal = %code, found = body.found, returned = body.results.len(), "OneMap search");
        Ok(body.results)
    }

    fn source(&self) -> LocationSource {
        LocationSource::OneMap
    }
}

// ─── Formatting ──────────────────────────────────────────────────

/// Format coordinates as "1.2824°N, 103.8589°E".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}
