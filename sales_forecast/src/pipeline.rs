//! Forecasting session and end-to-end helper

use crate::aggregate::{aggregate_daily, DailySeries};
use crate::config::TrainConfig;
use crate::data::{drop_duplicates, DataLoader, TransactionRow};
use crate::error::{ForecastError, Result};
use crate::features::{build_features, FeatureTable};
use crate::forecaster::{recursive_forecast, SalesForecast};
use crate::importance::{feature_importance, FeatureImportance};
use crate::metrics::EvaluationMetrics;
use crate::model::{ModelFamily, TrainedModel};
use crate::store;
use crate::trainer::{train, TrainingOutcome};
use std::path::Path;

/// Daily series and features of one dataset, plus an optional trained model
///
/// Training consumes the session and returns a new one carrying the model.
#[derive(Debug, Clone)]
pub struct SalesForecaster {
    daily: DailySeries,
    features: FeatureTable,
    model: Option<TrainedModel>,
}

impl SalesForecaster {
    /// Prepare a session from raw transactions
    ///
    /// Exact duplicate rows are dropped before aggregation.
    pub fn new(rows: Vec<TransactionRow>) -> Result<Self> {
        let rows = drop_duplicates(rows);
        let daily = aggregate_daily(&rows)?;
        Self::from_daily(daily)
    }

    /// Prepare a session from an existing daily series
    pub fn from_daily(daily: DailySeries) -> Result<Self> {
        let features = build_features(&daily)?;
        Ok(Self {
            daily,
            features,
            model: None,
        })
    }

    /// Prepare a session from a transaction CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataLoader::from_csv(path)?)
    }

    pub fn daily(&self) -> &DailySeries {
        &self.daily
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    /// Attached model, if any
    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn require_model(&self) -> Result<&TrainedModel> {
        self.model.as_ref().ok_or(ForecastError::ModelNotTrained)
    }

    /// Train a model on the session's features
    pub fn train(self, config: &TrainConfig) -> Result<(Self, TrainingOutcome)> {
        let outcome = train(&self.features, config)?;
        let session = self.with_model(outcome.model.clone());
        Ok((session, outcome))
    }

    /// Attach a previously trained or loaded model
    pub fn with_model(self, model: TrainedModel) -> Self {
        Self {
            model: Some(model),
            ..self
        }
    }

    /// Forecast `horizon` days after the last observed date
    pub fn predict_future(&self, horizon: usize) -> Result<SalesForecast> {
        recursive_forecast(self.require_model()?, &self.features, horizon)
    }

    /// Top `top_n` features of the attached model
    pub fn feature_importance(&self, top_n: usize) -> Result<FeatureImportance> {
        feature_importance(self.require_model()?, top_n)
    }

    /// Save the attached model to `path`
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        store::save_model(self.require_model()?, path)
    }

    /// Load a model artifact from `path` and attach it
    pub fn load_model<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let model = store::load_model(path)?;
        Ok(self.with_model(model))
    }
}

/// Everything produced by an end-to-end run
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub forecaster: SalesForecaster,
    pub forecast: SalesForecast,
    pub metrics: EvaluationMetrics,
}

/// Load, train and forecast with the given training settings
pub fn run_forecast<P: AsRef<Path>>(
    path: P,
    horizon: usize,
    config: &TrainConfig,
) -> Result<ForecastRun> {
    let session = SalesForecaster::from_csv(path)?;
    let (forecaster, outcome) = session.train(config)?;
    let forecast = forecaster.predict_future(horizon)?;
    Ok(ForecastRun {
        forecaster,
        forecast,
        metrics: outcome.metrics,
    })
}

/// Load a transaction CSV, train a model of `family` and forecast `horizon` days
pub fn generate_forecast<P: AsRef<Path>>(
    path: P,
    horizon: usize,
    family: ModelFamily,
) -> Result<ForecastRun> {
    run_forecast(path, horizon, &TrainConfig::new(family))
}
