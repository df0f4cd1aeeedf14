//! # Sales Forecast
//!
//! A Rust library for short-horizon forecasting of daily retail sales.
//!
//! ## Features
//!
//! - Transaction CSV loading and duplicate removal
//! - Daily aggregation without gap filling
//! - Calendar, lag, rolling-mean and trend features
//! - Linear, random forest and gradient boosting models over a temporal split
//! - Recursive multi-day forecasts with non-negative predictions
//! - Feature importance for tree ensembles
//! - Versioned model artifacts
//!
//! ## Quick Start
//!
//! ```no_run
//! use sales_forecast::{ModelFamily, SalesForecaster, TrainConfig};
//!
//! # fn main() -> Result<(), sales_forecast::ForecastError> {
//! let session = SalesForecaster::from_csv("sales_data.csv")?;
//!
//! let (session, outcome) = session.train(&TrainConfig::new(ModelFamily::RandomForest))?;
//! println!("{}", outcome.metrics);
//!
//! let forecast = session.predict_future(30)?;
//! forecast.to_csv("forecast.csv")?;
//!
//! println!("{}", session.feature_importance(10)?);
//! session.save_model("model.json")?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod importance;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod trainer;

// Re-export commonly used types
pub use crate::aggregate::{aggregate_daily, DailyRecord, DailySeries};
pub use crate::config::{BoostingParams, ForecastConfig, ForestParams, TrainConfig};
pub use crate::data::{drop_duplicates, DataLoader, TransactionRow};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_features, FeatureMatrix, FeatureRow, FeatureTable, FEATURE_NAMES};
pub use crate::forecaster::{recursive_forecast, ForecastPoint, SalesForecast};
pub use crate::importance::{feature_importance, FeatureImportance};
pub use crate::metrics::EvaluationMetrics;
pub use crate::model::{FittedModel, ModelFamily, TrainedModel};
pub use crate::pipeline::{generate_forecast, run_forecast, ForecastRun, SalesForecaster};
pub use crate::store::{from_bytes, load_model, save_model, to_bytes};
pub use crate::trainer::{train, HoldoutPredictions, TrainingOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
