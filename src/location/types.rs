//! Core types for the location subsystem.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in a Singapore postal code.
pub const POSTAL_CODE_LEN: usize = 6;

/// A validated Singapore postal code: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Validate a raw user string. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let trimmed = raw.trim();
        if trimmed.len() == POSTAL_CODE_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(LocationError::InvalidInput(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which provider produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    OneMap,
    Database,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneMap => write!(f, "OneMap"),
            Self::Database => write!(f, "Local database"),
        }
    }
}

/// A coordinate as it appears in address records. OneMap sends strings,
/// hand-built databases often carry plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v).filter(|v| v.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// One raw address row, shared by the OneMap API and the local database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(rename = "POSTAL", default)]
    pub postal: String,
    #[serde(rename = "ADDRESS", default)]
    pub address: String,
    #[serde(rename = "ROAD_NAME", default)]
    pub road_name: String,
    #[serde(rename = "BUILDING", default, deserialize_with = "nil_as_none")]
    pub building: Option<String>,
    #[serde(rename = "LATITUDE")]
    pub latitude: Coordinate,
    #[serde(rename = "LONGITUDE")]
    pub longitude: Coordinate,
}

/// OneMap writes "NIL" where a block has no building name.
fn nil_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("NIL")))
}

/// A fully resolved location with coordinates and provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub postal_code: PostalCode,
    pub address: String,
    pub road_name: String,
    pub building: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub source: LocationSource,
}

impl ResolvedLocation {
    pub(crate) fn from_record(
        postal_code: PostalCode,
        record: AddressRecord,
        source: LocationSource,
    ) -> Result<Self, LocationError> {
        let (lat, lon) = match (record.latitude.value(), record.longitude.value()) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(LocationError::Lookup(format!(
                    "unusable coordinates for {}",
                    postal_code
                )))
            }
        };
        Ok(Self {
            postal_code,
            address: record.address,
            road_name: record.road_name,
            building: record.building,
            lat,
            lon,
            source,
        })
    }

    /// Building name, or "N/A" when the block has none.
    pub fn building_label(&self) -> &str {
        self.building.as_deref().unwrap_or("N/A")
    }

    pub fn display_line(&self) -> String {
        format!(
            "\u{1F4CD} {}\n  \u{1F3E2} {} / {}\n  \u{1F4D0} {}",
            self.address,
            self.road_name,
            self.building_label(),
            super::format_coords(self.lat, self.lon)
        )
    }
}

/// Location resolution errors. All of them end the current request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Please enter a valid 6-digit postal code (e.g., 018989), got '{0}'")]
    InvalidInput(String),

    #[error("Postal code {0} not found. Please verify the code and try again.")]
    NotFound(String),

    #[error("Address lookup service unavailable: {0}")]
    Lookup(String),
}

impl LocationError {
    /// Stable machine-readable kind, used by the API and the CLI exit code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Lookup(_) => "lookup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_valid() {
        let code = PostalCode::parse("018956").unwrap();
        assert_eq!(code.as_str(), "018956");
    }

    #[test]
    fn test_postal_code_trims_whitespace() {
        let code = PostalCode::parse("  238801\n").unwrap();
        assert_eq!(code.to_string(), "238801");
    }

    #[test]
    fn test_postal_code_rejects_malformed() {
        for raw in ["", "00000", "0189567", "01895a", "01 956", "１２３４５６", "-18956"] {
            let err = PostalCode::parse(raw).unwrap_err();
            assert_eq!(err.kind(), "invalid_input", "input {:?}", raw);
        }
    }

    #[test]
    fn test_record_nil_building() {
        let json = r#"{
            "POSTAL": "018956",
            "ADDRESS": "10 BAYFRONT AVENUE SINGAPORE 018956",
            "ROAD_NAME": "BAYFRONT AVENUE",
            "BUILDING": "NIL",
            "LATITUDE": "1.28236",
            "LONGITUDE": "103.85892"
        }"#;
        let record: AddressRecord = serde_json::from_str(json).unwrap();
        assert!(record.building.is_none());
        assert_eq!(record.latitude.value(), Some(1.28236));
    }

    #[test]
    fn test_record_numeric_coordinates() {
        let json = r#"{"POSTAL":"238801","ADDRESS":"A","ROAD_NAME":"R",
            "BUILDING":"TOWER","LATITUDE":1.3,"LONGITUDE":103.8}"#;
        let record: AddressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.building.as_deref(), Some("TOWER"));
        assert_eq!(record.longitude.value(), Some(103.8));
    }

    #[test]
    fn test_bad_coordinates_are_lookup_errors() {
        let record = AddressRecord {
            postal: "018956".into(),
            address: "A".into(),
            road_name: "R".into(),
            building: None,
            latitude: Coordinate::Text("not-a-number".into()),
            longitude: Coordinate::Number(103.8),
        };
        let code = PostalCode::parse("018956").unwrap();
        let err = ResolvedLocation::from_record(code, record, LocationSource::OneMap).unwrap_err();
        assert_eq!(err.kind(), "lookup");
    }
}
