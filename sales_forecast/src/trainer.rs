//! Temporal train/test split, model fitting and evaluation

use crate::config::TrainConfig;
use crate::error::{ForecastError, Result};
use crate::features::FeatureTable;
use crate::metrics::EvaluationMetrics;
use crate::model::TrainedModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fewest feature rows a model is trained on
pub const MIN_FEATURE_ROWS: usize = 10;

/// Actual and predicted values over the held-out tail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutPredictions {
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub metrics: EvaluationMetrics,
    pub holdout: HoldoutPredictions,
    pub n_train: usize,
    pub n_test: usize,
}

/// Training and held-out sizes for `n_rows` rows
///
/// The held-out size is `ceil(test_size * n_rows)`.
pub fn split_sizes(n_rows: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if n_rows < MIN_FEATURE_ROWS {
        return Err(ForecastError::UntrainableInput(format!(
            "Need at least {} feature rows, got {}",
            MIN_FEATURE_ROWS, n_rows
        )));
    }

    let n_test = (test_size * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_test == 0 || n_train < 2 {
        return Err(ForecastError::UntrainableInput(format!(
            "Cannot split {} rows with test_size {}",
            n_rows, test_size
        )));
    }
    Ok((n_train, n_test))
}

/// Fit a model on the oldest rows and evaluate it on the most recent ones
///
/// Rows are never shuffled: the held-out set is the contiguous tail of the
/// table.
pub fn train(table: &FeatureTable, config: &TrainConfig) -> Result<TrainingOutcome> {
    config.validate()?;
    let (n_train, n_test) = split_sizes(table.len(), config.test_size)?;
    let (train_rows, test_rows) = table.split_at(n_train);

    let train_x = train_rows.to_matrix();
    let train_y = train_rows.targets();
    let test_x = test_rows.to_matrix();
    let test_y = test_rows.targets();

    let model = TrainedModel::fit(config, &train_x, &train_y)?;

    let train_pred = model.predict(&train_x)?;
    let test_pred = model.predict(&test_x)?;

    let metrics = EvaluationMetrics::evaluate(
        &train_y.to_vec(),
        &train_pred.to_vec(),
        &test_y.to_vec(),
        &test_pred.to_vec(),
    )?;

    info!(
        family = %config.family,
        n_train,
        n_test,
        train_mae = metrics.train_mae,
        test_mae = metrics.test_mae,
        test_r2 = metrics.test_r2,
        "Model trained"
    );

    Ok(TrainingOutcome {
        model,
        metrics,
        holdout: HoldoutPredictions {
            dates: test_rows.dates(),
            actual: test_y.to_vec(),
            predicted: test_pred.to_vec(),
        },
        n_train,
        n_test,
    })
}
