//! Metrics for evaluating model fit on the training and held-out partitions

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::InvalidInput(
            "Actual and predicted values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root mean squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Coefficient of determination
///
/// For a constant target the score is 1.0 when every prediction is exact
/// and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mean = actual.iter().mean();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Fit quality on both partitions of a temporal split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub train_mae: f64,
    pub train_rmse: f64,
    pub train_r2: f64,
    pub test_mae: f64,
    pub test_rmse: f64,
    pub test_r2: f64,
}

impl EvaluationMetrics {
    /// Score training and held-out predictions against their actuals
    pub fn evaluate(
        train_actual: &[f64],
        train_predicted: &[f64],
        test_actual: &[f64],
        test_predicted: &[f64],
    ) -> Result<Self> {
        Ok(Self {
            train_mae: mean_absolute_error(train_actual, train_predicted)?,
            train_rmse: root_mean_squared_error(train_actual, train_predicted)?,
            train_r2: r2_score(train_actual, train_predicted)?,
            test_mae: mean_absolute_error(test_actual, test_predicted)?,
            test_rmse: root_mean_squared_error(test_actual, test_predicted)?,
            test_r2: r2_score(test_actual, test_predicted)?,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Training:")?;
        writeln!(f, "  MAE:   {:.4}", self.train_mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.train_rmse)?;
        writeln!(f, "  R2:    {:.4}", self.train_r2)?;
        writeln!(f, "Test:")?;
        writeln!(f, "  MAE:   {:.4}", self.test_mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.test_rmse)?;
        write!(f, "  R2:    {:.4}", self.test_r2)
    }
}
