//! Configuration: `~/.floodrisk/config.toml`, overridable from the CLI.
//!
//! A missing file means defaults. Every section and key is optional.

use crate::location::{AddressDatabase, AddressLookup, OneMapClient, ONEMAP_SEARCH_URL};
use crate::risk::{DepthRange, RiskBands, RiskSampler};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid address database {path}: {message}")]
    Database { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub onemap_url: String,
    pub timeout_secs: u64,
    /// Local address table. When set, OneMap is not used.
    pub database: Option<PathBuf>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            onemap_url: ONEMAP_SEARCH_URL.into(),
            timeout_secs: 5,
            database: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub depth_min: f64,
    pub depth_max: f64,
    pub medium_from: f64,
    pub high_from: f64,
    pub flood_prone_probability: f64,
    pub hotspot_probability: f64,
    pub scenarios: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            depth_min: 0.0,
            depth_max: 1.5,
            medium_from: 0.5,
            high_from: 1.0,
            flood_prone_probability: 0.15,
            hotspot_probability: 0.10,
            scenarios: vec!["Baseline".into(), "RCP8.5".into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub geocoder: GeocoderConfig,
    pub risk: RiskConfig,
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".floodrisk")
            .join("config.toml")
    }

    /// Load from an explicit path (must exist) or the default path (may be absent).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.risk;
        if !r.depth_min.is_finite() || !r.depth_max.is_finite() || r.depth_min < 0.0 {
            return Err(ConfigError::Invalid(
                "depth range must be finite and non-negative".into(),
            ));
        }
        if r.depth_min >= r.depth_max {
            return Err(ConfigError::Invalid(format!(
                "depth_min ({}) must be below depth_max ({})",
                r.depth_min, r.depth_max
            )));
        }
        if !r.medium_from.is_finite() || !r.high_from.is_finite() || r.medium_from > r.high_from {
            return Err(ConfigError::Invalid(format!(
                "medium_from ({}) must not exceed high_from ({})",
                r.medium_from, r.high_from
            )));
        }
        for (name, p) in [
            ("flood_prone_probability", r.flood_prone_probability),
            ("hotspot_probability", r.hotspot_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{} must be within 0..=1, got {}", name, p)));
            }
        }
        if r.scenarios.is_empty() || r.scenarios.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("at least one named scenario is required".into()));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(ConfigError::Invalid("geocoder timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn sampler(&self) -> Result<RiskSampler, ConfigError> {
        let r = &self.risk;
        RiskSampler::new(
            DepthRange {
                min: r.depth_min,
                max: r.depth_max,
            },
            RiskBands {
                medium_from: r.medium_from,
                high_from: r.high_from,
            },
        )?
        .with_indicator_probabilities(r.flood_prone_probability, r.hotspot_probability)
    }

    /// Build the configured lookup provider. Loads the database eagerly.
    pub fn provider(&self) -> Result<Box<dyn AddressLookup>, ConfigError> {
        match &self.geocoder.database {
            Some(path) => Ok(Box::new(AddressDatabase::load(path)?)),
            None => Ok(Box::new(OneMapClient::new(
                self.geocoder.onemap_url.clone(),
                Duration::from_secs(self.geocoder.timeout_secs),
            ))),
        }
    }
}
