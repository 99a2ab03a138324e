//! Location resolver: validate, look up, take the first exact match.
//!
//! Flow: format check → provider search → first row carrying the exact
//! postal code, or NotFound. OneMap searches fuzzily, so rows for
//! neighbouring codes are skipped. No retries and no caching.

use super::providers::AddressLookup;
use super::types::{LocationError, PostalCode, ResolvedLocation};

pub struct LocationResolver {
    provider: Box<dyn AddressLookup>,
}

impl LocationResolver {
    pub fn new(provider: Box<dyn AddressLookup>) -> Self {
        Self { provider }
    }

    /// Resolve a raw postal code string.
    ///
    /// Malformed input fails before the provider is touched.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedLocation, LocationError> {
        let code = PostalCode::parse(raw)?;
        self.resolve_code(code)
    }

    pub fn resolve_code(&self, code: PostalCode) -> Result<ResolvedLocation, LocationError> {
        let rows = self.provider.search(&code).inspect_err(|e| {
            tracing::warn!(postal = %code, source = %self.provider.source(), "lookup failed: {}", e);
        })?;

        let returned = rows.len();
        match rows.into_iter().find(|row| row.postal.trim() == code.as_str()) {
            Some(row) => ResolvedLocation::from_record(code, row, self.provider.source()),
            None => {
                tracing::debug!(postal = %code, returned, "no exact postal match");
                Err(LocationError::NotFound(code.to_string()))
            }
        }
    }
}
