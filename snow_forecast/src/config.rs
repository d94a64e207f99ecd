//! Application configuration and the resort registry
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! file yields the stock setup: a 12 month horizon, November-April seasons
//! compared over 11 seasons, and the seven bundled resorts.

use crate::comparison::SeasonSettings;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use crate::data::ColumnMapping;

/// Shortest forecast horizon a request may ask for
pub const MIN_HORIZON_MONTHS: usize = 6;
/// Longest forecast horizon a request may ask for
pub const MAX_HORIZON_MONTHS: usize = 36;

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub prediction: PredictionConfig,

    #[serde(default = "default_resorts")]
    pub resorts: Vec<ResortEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prediction: PredictionConfig::default(),
            resorts: default_resorts(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::NotFound(format!(
                "Configuration file {}",
                path.display()
            )));
        }
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.prediction.validate()?;
        if self.resorts.iter().any(|r| r.name.trim().is_empty()) {
            return Err(ForecastError::ConfigError(
                "Resort names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resort registry resolving files against `base_dir`
    pub fn registry(&self, base_dir: impl Into<PathBuf>) -> Result<ResortRegistry> {
        ResortRegistry::new(base_dir, self.resorts.clone())
    }
}

/// Forecast and comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Months forecast beyond the last observation
    #[serde(default = "default_horizon_months")]
    pub horizon_months: usize,

    #[serde(default)]
    pub season: SeasonSettings,

    #[serde(default)]
    pub columns: ColumnMapping,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon_months: default_horizon_months(),
            season: SeasonSettings::default(),
            columns: ColumnMapping::default(),
        }
    }
}

impl PredictionConfig {
    /// Check the horizon and season settings
    pub fn validate(&self) -> Result<()> {
        validate_horizon(self.horizon_months)?;
        self.season.validate()
    }
}

/// Check a horizon against the allowed range
pub fn validate_horizon(horizon_months: usize) -> Result<usize> {
    if (MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&horizon_months) {
        Ok(horizon_months)
    } else {
        Err(ForecastError::ValidationError(format!(
            "Horizon must be between {} and {} months, got {}",
            MIN_HORIZON_MONTHS, MAX_HORIZON_MONTHS, horizon_months
        )))
    }
}

fn default_horizon_months() -> usize {
    12
}

/// Model and observation files of one resort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResortEntry {
    /// Display name, unique within a registry
    pub name: String,
    /// Model file, relative to the registry base directory unless absolute
    pub model_file: PathBuf,
    /// Observation CSV, relative to the registry base directory unless absolute
    pub csv_file: PathBuf,
}

impl ResortEntry {
    /// Create a new resort entry
    pub fn new(
        name: impl Into<String>,
        model_file: impl Into<PathBuf>,
        csv_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            model_file: model_file.into(),
            csv_file: csv_file.into(),
        }
    }
}

fn default_resorts() -> Vec<ResortEntry> {
    [
        ("Nozawa Onsen", "nozawa", "nozawa"),
        ("Yuzawa", "yuzawa", "Yuzawa"),
        ("Hakuba", "hakuba", "Hakuba"),
        ("Karuizawa", "karuizawa", "Karuizawa"),
        ("Sugadaira", "sugadaira", "Sugadaira"),
        ("Kusatsu", "kusatsu", "Kusatsu"),
        ("Inawashiro", "inawashiro", "Inawashiro"),
    ]
    .into_iter()
    .map(|(name, model, csv)| {
        ResortEntry::new(
            name,
            format!("data/{}_model.json", model),
            format!("data/{}_data.csv", csv),
        )
    })
    .collect()
}

/// Lookup from resort name to its model and observation files
#[derive(Debug, Clone)]
pub struct ResortRegistry {
    base_dir: PathBuf,
    entries: Vec<ResortEntry>,
}

impl ResortRegistry {
    /// Create a registry; resort names must be unique
    pub fn new(base_dir: impl Into<PathBuf>, entries: Vec<ResortEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ForecastError::ConfigError(format!(
                    "Duplicate resort '{}'",
                    entry.name
                )));
            }
        }

        Ok(Self {
            base_dir: base_dir.into(),
            entries,
        })
    }

    /// Entry for a resort name
    pub fn get(&self, name: &str) -> Result<&ResortEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ForecastError::NotFound(format!("Resort '{}'", name)))
    }

    /// Resort names in configured order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Resolved model file path
    pub fn model_path(&self, entry: &ResortEntry) -> PathBuf {
        self.base_dir.join(&entry.model_file)
    }

    /// Resolved observation file path
    pub fn csv_path(&self, entry: &ResortEntry) -> PathBuf {
        self.base_dir.join(&entry.csv_file)
    }

    /// Number of resorts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry has no resorts
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.prediction.horizon_months, 12);
        assert_eq!(config.prediction.season.season_window, 11);
        assert_eq!(config.resorts.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let registry = ResortRegistry::new(
            "/srv/snow",
            vec![ResortEntry::new("Hakuba", "/models/hakuba.json", "data/hakuba.csv")],
        )
        .unwrap();
        let entry = registry.get("Hakuba").unwrap();
        assert_eq!(registry.model_path(entry), PathBuf::from("/models/hakuba.json"));
        assert_eq!(registry.csv_path(entry), PathBuf::from("/srv/snow/data/hakuba.csv"));
    }
}
