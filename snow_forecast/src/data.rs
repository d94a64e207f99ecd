//! Historical observation handling
//!
//! Observations are monthly: one row per month start carrying the observed
//! snow depth (the target) and any number of named regressor values.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use season_math::first_of_month;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// A single monthly observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// First day of the observed month
    pub date: NaiveDate,
    /// Observed snow depth in centimetres
    pub target: f64,
    /// Regressor values keyed by name
    #[serde(default)]
    pub regressors: BTreeMap<String, f64>,
}

impl Observation {
    /// Create an observation without regressors; the date is truncated to its month start
    pub fn new(date: NaiveDate, target: f64) -> Self {
        Self {
            date: first_of_month(date),
            target,
            regressors: BTreeMap::new(),
        }
    }

    /// Add a regressor value
    pub fn with_regressor(mut self, name: impl Into<String>, value: f64) -> Self {
        self.regressors.insert(name.into(), value);
        self
    }

    /// Value of a regressor, 0.0 when the observation does not carry it
    pub fn regressor(&self, name: &str) -> f64 {
        self.regressors.get(name).copied().unwrap_or(0.0)
    }
}

/// Monthly observations of one resort, sorted by date with unique dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    observations: Vec<Observation>,
}

impl HistoricalSeries {
    /// Build a series, sorting by date and rejecting duplicate months
    pub fn new(mut observations: Vec<Observation>) -> Result<Self> {
        for obs in observations.iter_mut() {
            obs.date = first_of_month(obs.date);
        }
        observations.sort_by_key(|obs| obs.date);

        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::DataError(format!(
                "Duplicate observation for month {}",
                pair[0].date.format("%Y-%m")
            )));
        }

        Ok(Self { observations })
    }

    /// Series without observations
    pub fn empty() -> Self {
        Self::default()
    }

    /// All observations in date order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Observation dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|obs| obs.date).collect()
    }

    /// Latest observed month
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.date)
    }

    /// Names of every regressor carried by at least one observation
    pub fn regressor_names(&self) -> BTreeSet<String> {
        self.observations
            .iter()
            .flat_map(|obs| obs.regressors.keys().cloned())
            .collect()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }
}

/// Column names of a resort observation file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Month column, e.g. `Nov-15`, `2015-11` or `2015-11-01`
    #[serde(default = "default_date_column")]
    pub date_column: String,
    /// Observed snow depth column
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Regressor columns; missing cells are read as 0
    #[serde(default = "default_feature_columns")]
    pub feature_columns: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: default_date_column(),
            target_column: default_target_column(),
            feature_columns: default_feature_columns(),
        }
    }
}

fn default_date_column() -> String {
    "年月".to_string()
}
fn default_target_column() -> String {
    "最深積雪(cm)".to_string()
}
fn default_feature_columns() -> Vec<String> {
    vec![
        "日最高気温の平均(℃)".to_string(),
        "降雪量日合計3cm以上日数(日)".to_string(),
        "日最高気温0℃未満日数(日)".to_string(),
    ]
}

/// Parse a month cell into the first day of that month.
///
/// Accepts `Nov-15`, `2015-11`, `2015-11-01` and `2015/11/01`.
pub fn parse_month_start(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("01-{}", text), "%d-%b-%y"))
        .ok()
        .map(first_of_month)
}

/// Month start of a polars `Date` value, counted in days from 1970-01-01
fn month_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(i64::from(days))))
        .map(first_of_month)
}

/// Loader for resort observation files
#[derive(Debug)]
pub struct ObservationLoader;

impl ObservationLoader {
    /// Load observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, mapping: &ColumnMapping) -> Result<HistoricalSeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::NotFound(format!(
                "Observation file {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        debug!(path = %path.display(), rows = df.height(), "Loaded observation file");
        Self::from_dataframe(&df, mapping)
    }

    /// Create observations from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame, mapping: &ColumnMapping) -> Result<HistoricalSeries> {
        let dates = Self::month_column(df, &mapping.date_column)?;
        let targets = Self::numeric_column(df, &mapping.target_column)?;

        let column_names = df.get_column_names();
        let mut features = BTreeMap::new();
        for name in &mapping.feature_columns {
            let values: Vec<f64> = if column_names.contains(&name.as_str()) {
                Self::numeric_column(df, name)?
                    .into_iter()
                    .map(|v| v.unwrap_or(0.0))
                    .collect()
            } else {
                warn!(column = %name, "Feature column missing, treating as zero");
                vec![0.0; df.height()]
            };
            features.insert(name.clone(), values);
        }

        let mut observations = Vec::with_capacity(df.height());
        for (row, (date, target)) in dates.into_iter().zip(targets).enumerate() {
            let date = date.ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Unreadable month in column '{}' at row {}",
                    mapping.date_column,
                    row + 1
                ))
            })?;

            let Some(target) = target else {
                debug!(row = row + 1, month = %date, "Skipping row without target value");
                continue;
            };

            let mut obs = Observation::new(date, target);
            for (name, values) in &features {
                obs.regressors.insert(name.clone(), values[row]);
            }
            observations.push(obs);
        }

        HistoricalSeries::new(observations)
    }

    /// Read the month column as month-start dates
    fn month_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()?
                .into_iter()
                .map(|cell| cell.and_then(parse_month_start))
                .collect()),
            DataType::Date => Ok(col
                .date()?
                .into_iter()
                .map(|days| days.and_then(month_from_epoch_days))
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' cannot be read as months",
                column_name
            ))),
        }
    }

    /// Read a column as optional f64 values
    fn numeric_column(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        let cast = col.cast(&DataType::Float64).map_err(|e| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64: {}",
                column_name, e
            ))
        })?;
        let values: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_start_formats() {
        assert_eq!(parse_month_start("Nov-15"), Some(ymd(2015, 11, 1)));
        assert_eq!(parse_month_start("2015-11"), Some(ymd(2015, 11, 1)));
        assert_eq!(parse_month_start("2015-11-20"), Some(ymd(2015, 11, 1)));
        assert_eq!(parse_month_start(" 2016/02/01 "), Some(ymd(2016, 2, 1)));
        assert_eq!(parse_month_start("not a month"), None);
    }

    #[test]
    fn test_month_from_epoch_days() {
        assert_eq!(month_from_epoch_days(0), Some(ymd(1970, 1, 1)));
        assert_eq!(month_from_epoch_days(20_423), Some(ymd(2025, 12, 1)));
        // Dates before the epoch are negative
        assert_eq!(month_from_epoch_days(-1), Some(ymd(1969, 12, 1)));
        assert_eq!(month_from_epoch_days(-3_653), Some(ymd(1960, 1, 1)));
    }

    #[test]
    fn test_series_sorts_and_rejects_duplicates() {
        let series = HistoricalSeries::new(vec![
            Observation::new(ymd(2016, 1, 1), 80.0),
            Observation::new(ymd(2015, 12, 1), 40.0),
        ])
        .unwrap();
        assert_eq!(series.dates(), vec![ymd(2015, 12, 1), ymd(2016, 1, 1)]);
        assert_eq!(series.max_date(), Some(ymd(2016, 1, 1)));

        let duplicate = HistoricalSeries::new(vec![
            Observation::new(ymd(2016, 1, 1), 80.0),
            Observation::new(ymd(2016, 1, 15), 85.0),
        ]);
        assert!(matches!(duplicate, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn test_missing_regressor_reads_as_zero() {
        let obs = Observation::new(ymd(2016, 1, 1), 80.0).with_regressor("snowfall", 120.0);
        assert_eq!(obs.regressor("snowfall"), 120.0);
        assert_eq!(obs.regressor("temperature"), 0.0);
    }
}
