//! Prediction request orchestration
//!
//! Pipeline: resolve resort → load history and model → extend dates →
//! prepare regressors → predict → forecast table and season comparison.

use crate::comparison::{
    build_comparison, future_forecast_table, ChartData, ComparisonSeries, ForecastTableRow,
    SeasonSettings,
};
use crate::config::{validate_horizon, PredictionConfig, ResortRegistry};
use crate::data::{HistoricalSeries, ObservationLoader};
use crate::error::{ForecastError, Result};
use crate::features::prepare_future_features;
use crate::models::climatology::ClimatologyModel;
use crate::models::{ForecastModel, Frequency};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Source of forecasting models
pub trait ModelProvider: Send + Sync {
    /// Load the model stored at `path`
    fn load(&self, path: &Path) -> Result<Arc<dyn ForecastModel>>;
}

/// Loads [`ClimatologyModel`] JSON files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelProvider;

impl ModelProvider for JsonModelProvider {
    fn load(&self, path: &Path) -> Result<Arc<dyn ForecastModel>> {
        let model = ClimatologyModel::load(path)?;
        Ok(Arc::new(model))
    }
}

/// Keeps every model loaded by the inner provider for reuse
#[derive(Debug, Default)]
pub struct ModelCache<P> {
    inner: P,
    models: RwLock<HashMap<PathBuf, Arc<dyn ForecastModel>>>,
}

impl<P: ModelProvider> ModelCache<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached models
    pub fn len(&self) -> usize {
        self.models.read().map(|models| models.len()).unwrap_or(0)
    }

    /// Check if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: ModelProvider> ModelProvider for ModelCache<P> {
    fn load(&self, path: &Path) -> Result<Arc<dyn ForecastModel>> {
        let poisoned = || ForecastError::ModelError("Model cache lock poisoned".to_string());

        if let Some(model) = self.models.read().map_err(|_| poisoned())?.get(path) {
            return Ok(Arc::clone(model));
        }

        let model = self.inner.load(path)?;
        let mut models = self.models.write().map_err(|_| poisoned())?;
        let cached = models.entry(path.to_path_buf()).or_insert(model);
        debug!(path = %path.display(), "Cached model");
        Ok(Arc::clone(cached))
    }
}

/// A forecast request as submitted by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Resort name
    pub resort: String,
    /// Months to show, from the configured winter months
    pub months: Vec<u32>,
    /// Forecast horizon; the configured horizon when absent
    #[serde(default)]
    pub horizon_months: Option<usize>,
}

impl PredictionRequest {
    /// Request for the given resort and months
    pub fn new(resort: impl Into<String>, months: Vec<u32>) -> Self {
        Self {
            resort: resort.into(),
            months,
            horizon_months: None,
        }
    }

    /// Set the horizon
    pub fn with_horizon(mut self, horizon_months: usize) -> Self {
        self.horizon_months = Some(horizon_months);
        self
    }
}

/// Everything the presentation layer needs for one forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Resort name
    pub resort_name: String,
    /// Months shown, in season order
    pub months: Vec<u32>,
    /// Future forecast rows
    pub prediction_table: Vec<ForecastTableRow>,
    /// Grouped bar chart payload
    pub chart_data: ChartData,
    /// Season comparison the chart was built from
    pub comparison: ComparisonSeries,
}

impl PredictionReport {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Check a month selection against the compared months and order it by season
pub fn validate_month_selection(months: &[u32], settings: &SeasonSettings) -> Result<Vec<u32>> {
    if months.is_empty() {
        return Err(ForecastError::ValidationError(
            "Select at least one month".to_string(),
        ));
    }
    if let Some(month) = months.iter().find(|&&m| !settings.winter_months.contains(&m)) {
        return Err(ForecastError::ValidationError(format!(
            "Month {} is not one of the compared months {:?}",
            month, settings.winter_months
        )));
    }

    Ok(settings.calendar()?.order_months(months)?)
}

/// Run the forecast for already loaded inputs.
///
/// `months` must already be validated; errors from the model's `predict`
/// propagate unchanged.
pub fn forecast_report(
    resort_name: &str,
    model: &dyn ForecastModel,
    history: &HistoricalSeries,
    months: &[u32],
    horizon_months: usize,
    season: &SeasonSettings,
) -> Result<PredictionReport> {
    let skeleton = model.extend_with_future_dates(horizon_months, Frequency::MonthStart)?;
    let regressors = model.required_regressor_names();
    let features = prepare_future_features(history, &skeleton, &regressors);

    debug!(
        rows = features.len(),
        regressors = regressors.len(),
        model = model.name(),
        "Running model prediction"
    );
    let forecast = model.predict(&features)?;

    let prediction_table = future_forecast_table(&forecast, history, months);
    let comparison = build_comparison(&forecast, history, &season.with_months(months))?;
    let chart_data = comparison.to_chart();

    Ok(PredictionReport {
        resort_name: resort_name.to_string(),
        months: months.to_vec(),
        prediction_table,
        chart_data,
        comparison,
    })
}

/// Serves forecast requests for the resorts of a registry
#[derive(Debug)]
pub struct PredictionService<P> {
    config: PredictionConfig,
    registry: ResortRegistry,
    models: P,
}

impl<P: ModelProvider> PredictionService<P> {
    /// Create a new service
    pub fn new(config: PredictionConfig, registry: ResortRegistry, models: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            models,
        })
    }

    /// Names of the resorts that can be requested
    pub fn resort_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Forecast configuration in use
    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Answer one forecast request
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionReport> {
        let months = validate_month_selection(&request.months, &self.config.season)?;
        let horizon = validate_horizon(
            request
                .horizon_months
                .unwrap_or(self.config.horizon_months),
        )?;

        let entry = self.registry.get(&request.resort)?;
        info!(resort = %entry.name, horizon, months = ?months, "Starting prediction");

        let history = ObservationLoader::from_csv(
            self.registry.csv_path(entry),
            &self.config.columns,
        )?;
        let model = self.models.load(&self.registry.model_path(entry))?;

        let report = forecast_report(
            &entry.name,
            model.as_ref(),
            &history,
            &months,
            horizon,
            &self.config.season,
        )?;

        info!(
            resort = %entry.name,
            table_rows = report.prediction_table.len(),
            seasons = report.comparison.series().len(),
            "Prediction finished"
        );
        Ok(report)
    }
}
