use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::{ForecastConfig, ForecastError, ModelFamily, TrainConfig};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = TrainConfig::default();
    assert_eq!(config.family, ModelFamily::RandomForest);
    assert_eq!(config.test_size, 0.2);
    assert_eq!(config.forest.n_estimators, 100);
    assert_eq!(config.forest.max_depth, 15);
    assert_eq!(config.forest.min_samples_split, 5);
    assert_eq!(config.boosting.n_estimators, 100);
    assert_eq!(config.boosting.max_depth, 5);
    assert_eq!(config.boosting.learning_rate, 0.1);
    assert_eq!(config.seed, 42);

    let forecast = ForecastConfig::default();
    assert_eq!(forecast.horizon, 30);
    assert_eq!(forecast.top_n, 10);
    assert!(forecast.data_path.is_none());
}

#[test]
fn test_builder() {
    let config = TrainConfig::new(ModelFamily::Linear)
        .with_family(ModelFamily::GradientBoosting)
        .with_test_size(0.25)
        .with_n_estimators(7)
        .with_seed(9);

    assert_eq!(config.family, ModelFamily::GradientBoosting);
    assert_eq!(config.test_size, 0.25);
    assert_eq!(config.forest.n_estimators, 7);
    assert_eq!(config.boosting.n_estimators, 7);
    assert_eq!(config.seed, 9);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml() {
    let text = r#"
        data_path = "data/sales_data.csv"
        horizon = 14

        [train]
        family = "gradient_boosting"

        [train.boosting]
        learning_rate = 0.05
    "#;

    let config = ForecastConfig::from_toml_str(text).unwrap();

    assert_eq!(config.data_path, Some(PathBuf::from("data/sales_data.csv")));
    assert_eq!(config.horizon, 14);
    assert_eq!(config.top_n, 10);
    assert_eq!(config.train.family, ModelFamily::GradientBoosting);
    assert_eq!(config.train.boosting.learning_rate, 0.05);
    assert_eq!(config.train.boosting.n_estimators, 100);
    assert_eq!(config.train.test_size, 0.2);
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "top_n = 5").unwrap();
    writeln!(file, "[train]").unwrap();
    writeln!(file, "family = \"linear\"").unwrap();

    let config = ForecastConfig::from_file(file.path()).unwrap();
    assert_eq!(config.top_n, 5);
    assert_eq!(config.train.family, ModelFamily::Linear);

    assert!(matches!(
        ForecastConfig::from_file("missing.toml"),
        Err(ForecastError::ConfigError(_))
    ));
}

#[test]
fn test_invalid_config() {
    assert!(matches!(
        ForecastConfig::from_toml_str("[train]\nfamily = \"arima\""),
        Err(ForecastError::ConfigError(_))
    ));
    assert!(matches!(
        ForecastConfig::from_toml_str("[train]\ntest_size = 1.2"),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(TrainConfig::default().with_n_estimators(0).validate().is_err());
}

#[rstest]
#[case("linear", ModelFamily::Linear)]
#[case("Random_Forest", ModelFamily::RandomForest)]
#[case("rf", ModelFamily::RandomForest)]
#[case(" gradient_boosting ", ModelFamily::GradientBoosting)]
fn test_model_family_from_str(#[case] input: &str, #[case] expected: ModelFamily) {
    assert_eq!(input.parse::<ModelFamily>().unwrap(), expected);
    assert_eq!(expected.to_string().parse::<ModelFamily>().unwrap(), expected);
}

#[test]
fn test_unknown_model_family() {
    assert!(matches!(
        "prophet".parse::<ModelFamily>(),
        Err(ForecastError::InvalidParameter(_))
    ));
}
