//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use sales_math::MathError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed or empty raw input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too little history left after featurisation to form a train/test split
    #[error("Untrainable input: {0}")]
    UntrainableInput(String),

    /// Forecast, importance or save requested without a trained model
    #[error("Model not trained yet. Call train() first.")]
    ModelNotTrained,

    /// Artifact could not be decoded or failed validation
    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),

    /// Prediction input does not carry the training feature names in training order
    #[error("Feature schema mismatch: model expects {expected:?}, got {actual:?}")]
    FeatureSchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Error raised while fitting or evaluating a regression family
    #[error("Model error: {0}")]
    Model(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error reading configuration
    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
