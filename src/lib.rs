//! # Snowcast
//!
//! `snowcast` bundles the snow depth forecasting workspace: calendar and
//! season helpers from [`season_math`] and the forecast pipeline from
//! [`snow_forecast`].
//!
//! ## Example
//!
//! ```
//! use snowcast::{season_of, SeasonLabel};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//! assert_eq!(season_of(date), SeasonLabel::new(2025));
//! ```

pub use season_math;
pub use snow_forecast;

pub use snow_forecast::{
    AppConfig, ForecastError, JsonModelProvider, ModelCache, PredictionReport, PredictionRequest,
    PredictionService, SeasonLabel,
};

use chrono::NaiveDate;
use season_math::SeasonCalendar;
use std::path::{Path, PathBuf};

/// Service type used by [`service_from_config`]
pub type DefaultService = PredictionService<ModelCache<JsonModelProvider>>;

/// Season of a date under the default November start
pub fn season_of(date: NaiveDate) -> SeasonLabel {
    SeasonCalendar::default().season_of(date)
}

/// Build a prediction service from a TOML configuration file.
///
/// Resort files are resolved against `base_dir`, or against the directory
/// holding the configuration file when `base_dir` is `None`.
pub fn service_from_config<P: AsRef<Path>>(
    config_path: P,
    base_dir: Option<PathBuf>,
) -> Result<DefaultService, ForecastError> {
    let config_path = config_path.as_ref();
    let config = AppConfig::load(config_path)?;
    let base_dir = base_dir.unwrap_or_else(|| {
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });

    let registry = config.registry(base_dir)?;
    PredictionService::new(config.prediction, registry, ModelCache::new(JsonModelProvider))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_of() {
        assert_eq!(season_of(ymd(2025, 11, 1)), SeasonLabel::new(2025));
        assert_eq!(season_of(ymd(2026, 4, 1)), SeasonLabel::new(2025));
        assert_eq!(season_of(ymd(2026, 10, 1)), SeasonLabel::new(2025));
    }

    #[test]
    fn test_service_from_missing_config() {
        let result = service_from_config("does/not/exist.toml", None);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_service_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snowcast.toml");
        std::fs::write(
            &path,
            "[prediction]\nhorizon_months = 18\n\n[[resorts]]\nname = \"Hakuba\"\nmodel_file = \"hakuba.json\"\ncsv_file = \"hakuba.csv\"\n",
        )
        .unwrap();

        let service = service_from_config(&path, None).unwrap();
        assert_eq!(service.resort_names(), vec!["Hakuba"]);
        assert_eq!(service.config().horizon_months, 18);
    }
}
