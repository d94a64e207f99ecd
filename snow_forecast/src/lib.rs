//! # Snow Forecast
//!
//! Season-over-season snow depth forecasts for ski resorts.
//!
//! ## Features
//!
//! - Monthly observation loading from resort CSV files
//! - A pluggable forecasting model interface with a monthly climatology baseline
//! - Seasonal-average imputation of future regressor values
//! - Ski-season bucketing and month-by-season pivots for comparison charts
//! - A future forecast table with non-negative estimates and bounds
//! - TOML configuration and a resort registry
//!
//! ## Season Comparison
//!
//! A ski season runs from November through April and is labelled by its two
//! calendar years, e.g. `2024-2025`. The comparison keeps the last ten
//! observed seasons plus the forecast season, one value per winter month.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use snow_forecast::{
//!     build_comparison, ForecastPoint, HistoricalSeries, Observation, SeasonSettings,
//! };
//!
//! let month = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
//! let history = HistoricalSeries::new(vec![
//!     Observation::new(month(2024, 12), 85.0),
//!     Observation::new(month(2025, 1), 140.0),
//! ])?;
//! let forecast = vec![ForecastPoint::new(month(2025, 12), -2.0, -20.0, 15.0)];
//!
//! let comparison = build_comparison(&forecast, &history, &SeasonSettings::default())?;
//! let future = comparison.future_season().unwrap();
//! assert_eq!(future.to_string(), "2025-2026");
//! assert_eq!(comparison.value(&future, 12), Some(0.0));
//! # Ok::<(), snow_forecast::ForecastError>(())
//! ```

pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use crate::comparison::{
    build_comparison, future_forecast_table, write_forecast_table_csv, ChartData, ChartDataset,
    ComparisonSeries, ForecastTableRow, SeasonSettings, SeasonValues,
};
pub use crate::config::{AppConfig, ColumnMapping, PredictionConfig, ResortEntry, ResortRegistry};
pub use crate::data::{HistoricalSeries, Observation, ObservationLoader};
pub use crate::error::ForecastError;
pub use crate::features::prepare_future_features;
pub use crate::models::climatology::ClimatologyModel;
pub use crate::models::{FeatureTable, ForecastModel, ForecastPoint, Frequency};
pub use crate::pipeline::{
    forecast_report, JsonModelProvider, ModelCache, ModelProvider, PredictionReport,
    PredictionRequest, PredictionService,
};
pub use season_math::{SeasonCalendar, SeasonLabel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
