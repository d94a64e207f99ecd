//! Error types for the snow_forecast crate

use polars::prelude::PolarsError;
use season_math::MathError;
use thiserror::Error;

/// Custom error types for the snow_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to request or input validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A resort, data file or model file that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error raised by a forecasting model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error in application configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from serializing or deserializing models and reports
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error from calendar and series helpers
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

impl ForecastError {
    /// Whether the error means a requested resource is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForecastError::NotFound(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
