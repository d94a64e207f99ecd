//! Forecasting model capability
//!
//! The statistical engine behind a forecast is pluggable: anything that can
//! extend the history with future month starts and predict a point estimate
//! with bounds for each row of a [`FeatureTable`] can drive the pipeline.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use season_math::clip_non_negative;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Spacing of future dates requested from a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// First day of every month
    #[default]
    MonthStart,
}

/// Model output for a single date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast month
    pub date: NaiveDate,
    /// Point estimate
    pub yhat: f64,
    /// Lower bound of the prediction interval
    pub yhat_lower: f64,
    /// Upper bound of the prediction interval
    pub yhat_upper: f64,
}

impl ForecastPoint {
    /// Create a new forecast point
    pub fn new(date: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            date,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }

    /// Copy with the estimate and both bounds clipped at zero, each independently
    pub fn clipped(&self) -> Self {
        Self {
            date: self.date,
            yhat: clip_non_negative(self.yhat),
            yhat_lower: clip_non_negative(self.yhat_lower),
            yhat_upper: clip_non_negative(self.yhat_upper),
        }
    }
}

/// Dates plus optional regressor columns handed to a model for prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl FeatureTable {
    /// Create a table holding only the date skeleton
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column, builder style
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Add or replace a column; it must have one value per date
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.dates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Column '{}' has {} values but the table has {} dates",
                name,
                values.len(),
                self.dates.len()
            )));
        }

        self.columns.insert(name, values);
        Ok(())
    }

    /// Add a column built alongside the skeleton
    pub(crate) fn set_column(&mut self, name: String, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(name, values);
    }

    /// Date skeleton
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Values of a column, if present
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Names of all columns
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// A forecasting engine for one resort.
///
/// Implementations are shared read-only across requests.
pub trait ForecastModel: Debug + Send + Sync {
    /// Name of the model
    fn name(&self) -> &str;

    /// Regressor columns the model expects in every feature table
    fn required_regressor_names(&self) -> Vec<String>;

    /// Every history date followed by `periods` future dates at `frequency`
    fn extend_with_future_dates(&self, periods: usize, frequency: Frequency)
        -> Result<Vec<NaiveDate>>;

    /// Forecast every row of `features`
    fn predict(&self, features: &FeatureTable) -> Result<Vec<ForecastPoint>>;
}

pub mod climatology;
