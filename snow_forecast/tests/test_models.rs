use approx::assert_relative_eq;
use chrono::NaiveDate;
use snow_forecast::data::{HistoricalSeries, Observation};
use snow_forecast::models::climatology::ClimatologyModel;
use snow_forecast::models::{FeatureTable, ForecastModel, Frequency};
use snow_forecast::ForecastError;
use tempfile::tempdir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three winters with December depths 40, 60 and 80
fn history() -> HistoricalSeries {
    HistoricalSeries::new(vec![
        Observation::new(ymd(2022, 12, 1), 40.0),
        Observation::new(ymd(2023, 1, 1), 100.0),
        Observation::new(ymd(2023, 12, 1), 60.0),
        Observation::new(ymd(2024, 1, 1), 120.0),
        Observation::new(ymd(2024, 12, 1), 80.0),
        Observation::new(ymd(2025, 1, 1), 140.0),
    ])
    .unwrap()
}

#[test]
fn test_climatology_forecast() {
    let model = ClimatologyModel::fit(&history()).unwrap();
    assert_eq!(model.name(), "Monthly Climatology");
    assert!(model.required_regressor_names().is_empty());

    let dates = model
        .extend_with_future_dates(12, Frequency::MonthStart)
        .unwrap();
    assert_eq!(dates.len(), 18);
    assert_eq!(dates.last(), Some(&ymd(2026, 1, 1)));

    let forecast = model.predict(&FeatureTable::new(dates)).unwrap();
    assert_eq!(forecast.len(), 18);

    let december = forecast
        .iter()
        .find(|p| p.date == ymd(2025, 12, 1))
        .unwrap();
    assert_relative_eq!(december.yhat, 60.0, epsilon = 1e-9);
    assert!(december.yhat_lower < december.yhat);
    assert!(december.yhat_upper > december.yhat);

    // Months never observed fall back to the mean of the fitted months
    let july = forecast.iter().find(|p| p.date == ymd(2025, 7, 1)).unwrap();
    assert_relative_eq!(july.yhat, 90.0, epsilon = 1e-9);
}

#[test]
fn test_regressor_effect() {
    let model = ClimatologyModel::fit(&history())
        .unwrap()
        .with_regressor("snow_days", 2.0);
    assert_eq!(model.required_regressor_names(), vec!["snow_days".to_string()]);

    let table = FeatureTable::new(vec![ymd(2025, 12, 1), ymd(2026, 1, 1)])
        .with_column("snow_days", vec![5.0, -10.0])
        .unwrap();
    let forecast = model.predict(&table).unwrap();
    assert_relative_eq!(forecast[0].yhat, 70.0, epsilon = 1e-9);
    assert_relative_eq!(forecast[1].yhat, 100.0, epsilon = 1e-9);

    let missing = model.predict(&FeatureTable::new(vec![ymd(2025, 12, 1)]));
    assert!(matches!(missing, Err(ForecastError::ModelError(_))));
}

#[test]
fn test_wider_interval() {
    let model = ClimatologyModel::fit(&history()).unwrap();
    let wide = model.clone().with_interval_width(0.95).unwrap();
    let table = FeatureTable::new(vec![ymd(2025, 12, 1)]);

    let narrow_point = model.predict(&table).unwrap()[0];
    let wide_point = wide.predict(&table).unwrap()[0];
    assert!(wide_point.yhat_upper > narrow_point.yhat_upper);
    assert!(wide_point.yhat_lower < narrow_point.yhat_lower);
}

#[test]
fn test_model_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hakuba_model.json");

    let model = ClimatologyModel::fit(&history())
        .unwrap()
        .with_regressor("snow_days", 1.5);
    model.save(&path).unwrap();

    let loaded = ClimatologyModel::load(&path).unwrap();
    assert_eq!(loaded.name(), model.name());
    assert_eq!(loaded.required_regressor_names(), model.required_regressor_names());
    assert_relative_eq!(loaded.interval_width(), 0.8);
    assert_relative_eq!(
        loaded.profile(12).unwrap().std_dev,
        model.profile(12).unwrap().std_dev,
        epsilon = 1e-9
    );
    assert_eq!(
        loaded.extend_with_future_dates(1, Frequency::MonthStart).unwrap(),
        model.extend_with_future_dates(1, Frequency::MonthStart).unwrap()
    );
}

#[test]
fn test_model_load_errors() {
    let dir = tempdir().unwrap();

    let missing = ClimatologyModel::load(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ForecastError::NotFound(_))));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    let result = ClimatologyModel::load(&garbage);
    assert!(matches!(result, Err(ForecastError::SerializationError(_))));
}

#[test]
fn test_model_file_with_bad_interval_width() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("yuzawa_model.json");
    let json = ClimatologyModel::fit(&history())
        .unwrap()
        .to_json()
        .unwrap()
        .replace("\"interval_width\": 0.8", "\"interval_width\": 3.0");
    std::fs::write(&path, json).unwrap();

    let result = ClimatologyModel::load(&path);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}
