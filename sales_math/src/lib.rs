//! # Sales Math
//!
//! Numeric building blocks for daily sales forecasting.
//! This crate provides the regression families used by the forecasting
//! core together with the trailing-window statistics its features rely on.

use ndarray::{Array1, Array2, ArrayView1};
use std::fmt::Debug;
use thiserror::Error;

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod rolling;
pub mod tree;

pub use boosting::{FittedGradientBoosting, GradientBoosting};
pub use forest::{FittedRandomForest, RandomForest};
pub use linear::{FittedLinearRegression, LinearRegression};
pub use rolling::TrailingMean;
pub use tree::{DecisionTreeRegressor, FittedTree};

/// Errors that can occur in regression and statistics calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// A regression family that can be fitted on a feature matrix
pub trait Regressor: Debug + Clone {
    /// The fitted model produced by this family
    type Fitted: FittedRegressor;

    /// Fit the model on `x` (one row per sample) against target `y`
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self::Fitted>;

    /// Name of the regression family
    fn name(&self) -> &str;
}

/// A fitted regression model
pub trait FittedRegressor: Debug {
    /// Number of input features the model was fitted with
    fn n_features(&self) -> usize;

    /// Predict a single sample
    fn predict_row(&self, row: ArrayView1<f64>) -> f64;

    /// Predict every row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.n_features(), x.ncols())?;
        Ok(x.outer_iter().map(|row| self.predict_row(row)).collect())
    }

    /// Relative per-feature importance, when the family has one
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

pub(crate) fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MathError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn check_training_shape(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(MathError::ShapeMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(MathError::InsufficientData(
            "Cannot fit a model on zero samples".to_string(),
        ));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Training data contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Normalise a vector of non-negative weights so it sums to one
pub(crate) fn normalize(weights: &mut [f64]) {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}
