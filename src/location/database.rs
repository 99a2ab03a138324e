//! Local address table, loaded once at startup.
//!
//! A JSON array of OneMap-shaped rows, optionally gzip-compressed
//! (`*.gz`). Rows are indexed by postal code and keep file order, so the
//! "first match" rule holds the same way it does for OneMap.

use super::providers::AddressLookup;
use super::types::{AddressRecord, LocationError, LocationSource, PostalCode};
use crate::config::ConfigError;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct AddressDatabase {
    by_postal: HashMap<String, Vec<AddressRecord>>,
}

impl AddressDatabase {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        let records: Vec<AddressRecord> =
            serde_json::from_reader(reader).map_err(|e| ConfigError::Database {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let db = Self::from_records(records);
        tracing::info!(path = %path.display(), postal_codes = db.len(), "address database loaded");
        Ok(db)
    }

    pub fn from_records(records: Vec<AddressRecord>) -> Self {
        let mut by_postal: HashMap<String, Vec<AddressRecord>> = HashMap::new();
        for record in records {
            by_postal
                .entry(record.postal.trim().to_string())
                .or_default()
                .push(record);
        }
        Self { by_postal }
    }

    /// Number of distinct postal codes.
    pub fn len(&self) -> usize {
        self.by_postal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_postal.is_empty()
    }
}

impl AddressLookup for AddressDatabase {
    fn search(&self, code: &PostalCode) -> Result<Vec<AddressRecord>, LocationError> {
        Ok(self.by_postal.get(code.as_str()).cloned().unwrap_or_default())
    }

    fn source(&self) -> LocationSource {
        LocationSource::Database
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const ROWS: &str = r#"[
        {"POSTAL":"018956","ADDRESS":"10 BAYFRONT AVENUE SINGAPORE 018956","ROAD_NAME":"BAYFRONT AVENUE",
         "BUILDING":"MARINA BAY SANDS","LATITUDE":"1.28236","LONGITUDE":"103.85892"},
        {"POSTAL":"018956","ADDRESS":"SECOND ROW","ROAD_NAME":"BAYFRONT AVENUE",
         "BUILDING":"NIL","LATITUDE":"1.2824","LONGITUDE":"103.8590"},
        {"POSTAL":"238801","ADDRESS":"1 ORCHARD ROAD","ROAD_NAME":"ORCHARD ROAD",
         "BUILDING":"NIL","LATITUDE":1.3048,"LONGITUDE":103.8318}
    ]"#;

    fn code(s: &str) -> PostalCode {
        PostalCode::parse(s).unwrap()
    }

    #[test]
    fn test_load_plain_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(&path, ROWS).unwrap();

        let db = AddressDatabase::load(&path).unwrap();
        assert_eq!(db.len(), 2);
        let rows = db.search(&code("018956")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].building.as_deref(), Some("MARINA BAY SANDS"));
    }

    #[test]
    fn test_load_gzip_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(ROWS.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let db = AddressDatabase::load(&path).unwrap();
        let rows = db.search(&code("238801")).unwrap();
        assert_eq!(rows[0].road_name, "ORCHARD ROAD");
        assert!(rows[0].building.is_none());
    }

    #[test]
    fn test_unknown_code_is_empty() {
        let db = AddressDatabase::from_records(vec![]);
        assert!(db.is_empty());
        assert!(db.search(&code("999999")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = AddressDatabase::load(&dir.path().join("nope.json")).err().unwrap();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = AddressDatabase::load(&path).err().unwrap();
        assert!(matches!(err, ConfigError::Database { .. }));
    }
}
