//! Season-over-season comparison
//!
//! Observed history and the forecast are merged into one monthly series,
//! restricted to winter months, bucketed into ski seasons and pivoted into
//! one value per (season, month) for a grouped bar chart. The newest season
//! holding forecast values is marked as the future season.

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use chrono::{Datelike, NaiveDate};
use season_math::{
    clip_non_negative, month_label, round_to, validate_month, SeasonCalendar, SeasonLabel,
    DEFAULT_SEASON_START_MONTH, DEFAULT_SEASON_WINDOW, DEFAULT_WINTER_MONTHS,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use tracing::debug;

/// Tunable parameters of the season comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSettings {
    /// Month in which a ski season begins
    #[serde(default = "default_season_start_month")]
    pub season_start_month: u32,
    /// Months compared across seasons
    #[serde(default = "default_winter_months")]
    pub winter_months: Vec<u32>,
    /// Number of most recent seasons kept, the forecast season included
    #[serde(default = "default_season_window")]
    pub season_window: usize,
}

impl Default for SeasonSettings {
    fn default() -> Self {
        Self {
            season_start_month: default_season_start_month(),
            winter_months: default_winter_months(),
            season_window: default_season_window(),
        }
    }
}

fn default_season_start_month() -> u32 {
    DEFAULT_SEASON_START_MONTH
}
fn default_winter_months() -> Vec<u32> {
    DEFAULT_WINTER_MONTHS.to_vec()
}
fn default_season_window() -> usize {
    DEFAULT_SEASON_WINDOW
}

impl SeasonSettings {
    /// Check month numbers and the window size
    pub fn validate(&self) -> Result<()> {
        validate_month(self.season_start_month)?;
        for &month in &self.winter_months {
            validate_month(month)?;
        }
        if self.season_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Season window must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Calendar assigning dates to seasons
    pub fn calendar(&self) -> Result<SeasonCalendar> {
        Ok(SeasonCalendar::new(self.season_start_month)?)
    }

    /// Copy of these settings comparing only `months`
    pub fn with_months(&self, months: &[u32]) -> Self {
        Self {
            winter_months: months.to_vec(),
            ..self.clone()
        }
    }
}

/// Values of one season, one entry per compared month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonValues {
    /// Season label
    pub season: SeasonLabel,
    /// Value per month, `None` where the month has no data
    pub values: Vec<Option<f64>>,
    /// Whether this is the forecast season
    pub is_future: bool,
}

/// Month-by-season table of snow depth values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    months: Vec<u32>,
    seasons: Vec<SeasonValues>,
}

impl ComparisonSeries {
    /// Comparison without data
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compared months in season order
    pub fn months(&self) -> &[u32] {
        &self.months
    }

    /// Season labels, oldest first
    pub fn seasons(&self) -> Vec<SeasonLabel> {
        self.seasons.iter().map(|s| s.season).collect()
    }

    /// Per-season rows, oldest first
    pub fn series(&self) -> &[SeasonValues] {
        &self.seasons
    }

    /// Values of one season aligned with [`months`](Self::months)
    pub fn values(&self, season: &SeasonLabel) -> Option<&[Option<f64>]> {
        self.seasons
            .iter()
            .find(|s| &s.season == season)
            .map(|s| s.values.as_slice())
    }

    /// Value of one (season, month) cell
    pub fn value(&self, season: &SeasonLabel, month: u32) -> Option<f64> {
        let index = self.months.iter().position(|&m| m == month)?;
        self.values(season)?.get(index).copied().flatten()
    }

    /// The forecast season, if any season holds forecast values
    pub fn future_season(&self) -> Option<SeasonLabel> {
        self.seasons.iter().find(|s| s.is_future).map(|s| s.season)
    }

    /// Check if the comparison holds no seasons
    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Chart payload: month labels and one dataset per season, the forecast
    /// season first and older seasons after it, newest to oldest
    pub fn to_chart(&self) -> ChartData {
        ChartData {
            labels: self.months.iter().map(|&m| month_label(m)).collect(),
            datasets: self
                .seasons
                .iter()
                .rev()
                .map(|s| ChartDataset {
                    label: s.season.to_string(),
                    data: s.values.clone(),
                    is_future: s.is_future,
                })
                .collect(),
        }
    }
}

/// Data for a grouped bar chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Month labels along the x axis
    pub labels: Vec<String>,
    /// One dataset per season
    pub datasets: Vec<ChartDataset>,
}

/// One season's bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    /// Season label, e.g. `2025-2026`
    pub label: String,
    /// Value per month label; `null` where there is no data
    pub data: Vec<Option<f64>>,
    /// Whether the bars show forecast values
    pub is_future: bool,
}

/// A merged series entry
#[derive(Debug, Clone, Copy)]
struct MergedPoint {
    date: NaiveDate,
    value: f64,
    forecast: bool,
}

/// Merge observed values with forecast values after the last observed month.
///
/// Both sources are clipped at zero. Forecast dates at or before the last
/// observation are dropped, so the two never overlap.
fn merge_history_and_forecast(
    forecast: &[ForecastPoint],
    historical: &HistoricalSeries,
    cutoff: NaiveDate,
) -> Vec<MergedPoint> {
    let observed = historical.observations().iter().map(|obs| MergedPoint {
        date: obs.date,
        value: clip_non_negative(obs.target),
        forecast: false,
    });

    let predicted = forecast
        .iter()
        .filter(|point| point.date > cutoff)
        .map(|point| MergedPoint {
            date: point.date,
            value: clip_non_negative(point.yhat),
            forecast: true,
        });

    observed.chain(predicted).collect()
}

/// Build the season-over-season comparison of history and forecast.
///
/// Returns an empty comparison when either input is empty or no date falls
/// in the compared months.
pub fn build_comparison(
    forecast: &[ForecastPoint],
    historical: &HistoricalSeries,
    settings: &SeasonSettings,
) -> Result<ComparisonSeries> {
    settings.validate()?;
    let calendar = settings.calendar()?;
    let months = calendar.order_months(&settings.winter_months)?;

    let Some(cutoff) = historical.max_date() else {
        return Ok(ComparisonSeries::empty());
    };
    if forecast.is_empty() {
        return Ok(ComparisonSeries::empty());
    }

    let merged: Vec<MergedPoint> = merge_history_and_forecast(forecast, historical, cutoff)
        .into_iter()
        .filter(|point| months.contains(&point.date.month()))
        .collect();
    if merged.is_empty() {
        return Ok(ComparisonSeries::empty());
    }

    let all_seasons: BTreeSet<SeasonLabel> = merged
        .iter()
        .map(|point| calendar.season_of(point.date))
        .collect();
    let skip = all_seasons.len().saturating_sub(settings.season_window);
    let kept: Vec<SeasonLabel> = all_seasons.into_iter().skip(skip).collect();

    // (sum, count) per cell; several entries in one cell are averaged
    let mut cells: BTreeMap<(SeasonLabel, u32), (f64, usize)> = BTreeMap::new();
    let mut forecast_seasons = BTreeSet::new();
    for point in &merged {
        let season = calendar.season_of(point.date);
        if !kept.contains(&season) {
            continue;
        }
        let cell = cells.entry((season, point.date.month())).or_insert((0.0, 0));
        cell.0 += point.value;
        cell.1 += 1;
        if point.forecast {
            forecast_seasons.insert(season);
        }
    }

    let future = kept
        .last()
        .copied()
        .filter(|season| forecast_seasons.contains(season));

    let seasons: Vec<SeasonValues> = kept
        .iter()
        .map(|&season| SeasonValues {
            season,
            values: months
                .iter()
                .map(|&month| {
                    cells
                        .get(&(season, month))
                        .map(|&(sum, count)| sum / count as f64)
                })
                .collect(),
            is_future: Some(season) == future,
        })
        .collect();

    debug!(
        seasons = seasons.len(),
        months = months.len(),
        future_season = ?future.map(|s| s.to_string()),
        "Built season comparison"
    );

    Ok(ComparisonSeries { months, seasons })
}

/// One row of the forecast table shown next to the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTableRow {
    /// Month as `YYYY-MM`
    pub date: String,
    /// Point estimate, clipped at zero
    pub predicted: f64,
    /// Lower bound, clipped at zero
    pub lower: f64,
    /// Upper bound, clipped at zero
    pub upper: f64,
}

/// Forecast rows after the last observed month, restricted to `months`.
///
/// Estimate and bounds are clipped at zero and rounded to one decimal.
/// Without history there is no cutoff to compare against and no rows are
/// produced.
pub fn future_forecast_table(
    forecast: &[ForecastPoint],
    historical: &HistoricalSeries,
    months: &[u32],
) -> Vec<ForecastTableRow> {
    let Some(cutoff) = historical.max_date() else {
        return Vec::new();
    };

    forecast
        .iter()
        .filter(|point| point.date > cutoff && months.contains(&point.date.month()))
        .map(|point| {
            let clipped = point.clipped();
            ForecastTableRow {
                date: clipped.date.format("%Y-%m").to_string(),
                predicted: round_to(clipped.yhat, 1),
                lower: round_to(clipped.yhat_lower, 1),
                upper: round_to(clipped.yhat_upper, 1),
            }
        })
        .collect()
}

/// Write forecast table rows as CSV with a header line
pub fn write_forecast_table_csv<W: Write>(rows: &[ForecastTableRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
