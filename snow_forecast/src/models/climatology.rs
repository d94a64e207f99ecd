//! Monthly climatology baseline
//!
//! Predicts each month as the historical mean snow depth of that calendar
//! month, shifted by linear regressor effects, with a normal prediction
//! interval from the month's spread. Models serialize to JSON so one file
//! per resort can be stored next to its observation data.

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{FeatureTable, ForecastModel, ForecastPoint, Frequency};
use chrono::{Datelike, NaiveDate};
use season_math::add_months;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default width of the prediction interval
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

/// Fitted statistics for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProfile {
    /// Calendar month, 1..=12
    pub month: u32,
    /// Mean target value
    pub mean: f64,
    /// Population standard deviation of the target
    pub std_dev: f64,
}

/// Monthly climatology model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyModel {
    /// Name of the model
    name: String,
    /// Months the model was fitted on
    history_dates: Vec<NaiveDate>,
    /// Per-month statistics for months present in the history
    profiles: Vec<MonthlyProfile>,
    /// Linear effect of each regressor on the point estimate
    #[serde(default)]
    regressors: BTreeMap<String, f64>,
    /// Probability mass inside the prediction interval
    interval_width: f64,
}

impl ClimatologyModel {
    /// Fit monthly means and spreads from a resort history
    pub fn fit(history: &HistoricalSeries) -> Result<Self> {
        if history.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit a climatology model on an empty history".to_string(),
            ));
        }

        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for obs in history.observations() {
            by_month.entry(obs.date.month()).or_default().push(obs.target);
        }

        let profiles = by_month
            .into_iter()
            .map(|(month, values)| MonthlyProfile {
                month,
                mean: values.iter().mean(),
                std_dev: values.iter().population_std_dev(),
            })
            .collect();

        Ok(Self {
            name: "Monthly Climatology".to_string(),
            history_dates: history.dates(),
            profiles,
            regressors: BTreeMap::new(),
            interval_width: DEFAULT_INTERVAL_WIDTH,
        })
    }

    /// Set the prediction interval width, strictly between 0 and 1
    pub fn with_interval_width(mut self, interval_width: f64) -> Result<Self> {
        self.interval_width = check_interval_width(interval_width)?;
        Ok(self)
    }

    /// Declare a regressor with a linear coefficient
    pub fn with_regressor(mut self, name: impl Into<String>, coefficient: f64) -> Self {
        self.regressors.insert(name.into(), coefficient);
        self
    }

    /// Fitted statistics for a calendar month
    pub fn profile(&self, month: u32) -> Option<&MonthlyProfile> {
        self.profiles.iter().find(|p| p.month == month)
    }

    /// Prediction interval width
    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }

    /// Serialize the model to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a model from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        if model.profiles.is_empty() {
            return Err(ForecastError::ModelError(
                "Model file contains no monthly profiles".to_string(),
            ));
        }
        check_interval_width(model.interval_width)?;
        Ok(model)
    }

    /// Write the model to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a model from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::NotFound(format!("Model file {}", path.display())));
        }

        Self::from_json(&fs::read_to_string(path)?)
    }

    /// z-score for the configured interval width
    fn z_score(&self) -> Result<f64> {
        let width = check_interval_width(self.interval_width)?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelError(format!("Normal distribution: {}", e)))?;
        Ok(normal.inverse_cdf(0.5 + width / 2.0))
    }

    /// Statistics used for months absent from the history
    fn fallback_profile(&self) -> (f64, f64) {
        let n = self.profiles.len().max(1) as f64;
        let mean = self.profiles.iter().map(|p| p.mean).sum::<f64>() / n;
        let std_dev = self.profiles.iter().map(|p| p.std_dev).fold(0.0, f64::max);
        (mean, std_dev)
    }
}

/// Interval widths must lie strictly between 0 and 1
fn check_interval_width(interval_width: f64) -> Result<f64> {
    if interval_width > 0.0 && interval_width < 1.0 {
        Ok(interval_width)
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "Interval width must be between 0 and 1, got {}",
            interval_width
        )))
    }
}

impl ForecastModel for ClimatologyModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_regressor_names(&self) -> Vec<String> {
        self.regressors.keys().cloned().collect()
    }

    fn extend_with_future_dates(
        &self,
        periods: usize,
        frequency: Frequency,
    ) -> Result<Vec<NaiveDate>> {
        let last = self.history_dates.last().copied().ok_or_else(|| {
            ForecastError::ModelError("Model has no history to extend".to_string())
        })?;

        let mut dates = self.history_dates.clone();
        match frequency {
            Frequency::MonthStart => {
                for step in 1..=periods {
                    dates.push(add_months(last, step as u32)?);
                }
            }
        }

        Ok(dates)
    }

    fn predict(&self, features: &FeatureTable) -> Result<Vec<ForecastPoint>> {
        let mut effects = Vec::with_capacity(self.regressors.len());
        for (name, coefficient) in &self.regressors {
            let column = features.column(name).ok_or_else(|| {
                ForecastError::ModelError(format!(
                    "Regressor '{}' missing from feature table",
                    name
                ))
            })?;
            if column.len() != features.len() {
                return Err(ForecastError::ModelError(format!(
                    "Regressor '{}' has {} values for {} dates",
                    name,
                    column.len(),
                    features.len()
                )));
            }
            effects.push((*coefficient, column));
        }

        let z = self.z_score()?;
        let fallback = self.fallback_profile();

        let points = features
            .dates()
            .iter()
            .enumerate()
            .map(|(row, &date)| {
                let (mean, std_dev) = self
                    .profile(date.month())
                    .map(|p| (p.mean, p.std_dev))
                    .unwrap_or(fallback);
                let yhat = mean
                    + effects
                        .iter()
                        .map(|(coefficient, column)| coefficient * column[row])
                        .sum::<f64>();
                let margin = z * std_dev;
                ForecastPoint::new(date, yhat, yhat - margin, yhat + margin)
            })
            .collect();

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_winters() -> HistoricalSeries {
        HistoricalSeries::new(vec![
            Observation::new(ymd(2023, 12, 1), 100.0),
            Observation::new(ymd(2024, 1, 1), 150.0),
            Observation::new(ymd(2024, 12, 1), 60.0),
            Observation::new(ymd(2025, 1, 1), 150.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_fit_monthly_profiles() {
        let model = ClimatologyModel::fit(&two_winters()).unwrap();
        let december = model.profile(12).unwrap();
        assert_eq!(december.mean, 80.0);
        assert!((december.std_dev - 20.0).abs() < 1e-9);
        assert_eq!(model.profile(1).unwrap().std_dev, 0.0);
        assert!(model.profile(7).is_none());
    }

    #[test]
    fn test_fit_empty_history_fails() {
        assert!(ClimatologyModel::fit(&HistoricalSeries::empty()).is_err());
    }

    #[test]
    fn test_extend_with_future_dates() {
        let model = ClimatologyModel::fit(&two_winters()).unwrap();
        let dates = model.extend_with_future_dates(3, Frequency::MonthStart).unwrap();
        assert_eq!(dates.len(), 7);
        assert_eq!(&dates[4..], &[ymd(2025, 2, 1), ymd(2025, 3, 1), ymd(2025, 4, 1)]);
    }

    #[test]
    fn test_interval_is_symmetric() {
        let model = ClimatologyModel::fit(&two_winters()).unwrap();
        let table = FeatureTable::new(vec![ymd(2025, 12, 1)]);
        let point = model.predict(&table).unwrap()[0];
        assert_eq!(point.yhat, 80.0);
        assert!(((point.yhat_upper - point.yhat) - (point.yhat - point.yhat_lower)).abs() < 1e-9);
        // 80% interval: z is about 1.2816
        assert!((point.yhat_upper - 80.0 - 1.2816 * 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_interval_width() {
        let model = ClimatologyModel::fit(&two_winters()).unwrap();
        assert!(model.clone().with_interval_width(1.0).is_err());
        assert!(model.clone().with_interval_width(f64::NAN).is_err());
        assert!(model.with_interval_width(0.95).is_ok());
    }

    #[test]
    fn test_stored_interval_width_is_checked() {
        let json = ClimatologyModel::fit(&two_winters())
            .unwrap()
            .to_json()
            .unwrap()
            .replace("\"interval_width\": 0.8", "\"interval_width\": 3.0");
        assert!(json.contains("\"interval_width\": 3.0"));

        let result = ClimatologyModel::from_json(&json);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }

    #[test]
    fn test_ragged_feature_table_is_rejected() {
        let model = ClimatologyModel::fit(&two_winters())
            .unwrap()
            .with_regressor("snow_days", 1.0);
        let table: FeatureTable = serde_json::from_str(
            r#"{"dates":["2025-12-01","2026-01-01"],"columns":{"snow_days":[1.0]}}"#,
        )
        .unwrap();

        let result = model.predict(&table);
        assert!(matches!(result, Err(ForecastError::ModelError(_))));
    }
}
