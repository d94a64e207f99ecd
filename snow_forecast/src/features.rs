//! Future regressor preparation
//!
//! Future months have no observed regressor values, so each regressor is
//! imputed with its historical average for the same calendar month. Months
//! the history never covers take the nearest earlier value in the future
//! skeleton, then the nearest later one.

use crate::data::HistoricalSeries;
use crate::models::FeatureTable;
use chrono::NaiveDate;
use season_math::{forward_backward_fill, mean, month_index};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Average of one regressor per calendar month, indexed 0 (January) to 11
pub type MonthlyAverages = [Option<f64>; 12];

/// Average each regressor over the observations of each calendar month.
///
/// A regressor absent from an observation counts as 0 for that observation,
/// so a regressor no observation carries averages to 0 wherever the history
/// has data.
pub fn seasonal_averages(
    historical: &HistoricalSeries,
    regressor_names: &[String],
) -> BTreeMap<String, MonthlyAverages> {
    let mut averages = BTreeMap::new();

    for name in regressor_names {
        let mut by_month: [Vec<f64>; 12] = Default::default();
        for obs in historical.observations() {
            by_month[month_index(obs.date)].push(obs.regressor(name));
        }

        let mut monthly: MonthlyAverages = [None; 12];
        for (slot, values) in monthly.iter_mut().zip(by_month.iter()) {
            *slot = mean(values);
        }
        averages.insert(name.clone(), monthly);
    }

    averages
}

/// Build the feature table for a future date skeleton.
///
/// Every regressor in `regressor_names` receives one value per date: the
/// seasonal average of the date's month, with remaining gaps forward then
/// backward filled. With no regressors the bare skeleton is returned.
pub fn prepare_future_features(
    historical: &HistoricalSeries,
    future_dates: &[NaiveDate],
    regressor_names: &[String],
) -> FeatureTable {
    let mut table = FeatureTable::new(future_dates.to_vec());
    if regressor_names.is_empty() {
        return table;
    }

    if historical.is_empty() {
        warn!(
            regressors = regressor_names.len(),
            "No history for seasonal averages, regressors default to zero"
        );
    }

    let averages = seasonal_averages(historical, regressor_names);
    for (name, monthly) in &averages {
        let mut values: Vec<Option<f64>> = future_dates
            .iter()
            .map(|date| monthly[month_index(*date)])
            .collect();

        if !forward_backward_fill(&mut values) {
            debug!(regressor = %name, "No month has data, filling with zero");
        }

        let covered = monthly.iter().filter(|v| v.is_some()).count();
        debug!(regressor = %name, months_covered = covered, "Prepared future regressor");

        let column = values.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        table.set_column(name.clone(), column);
    }

    table
}
