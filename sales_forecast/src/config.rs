//! Training and forecasting configuration

use crate::error::{ForecastError, Result};
use crate::model::ModelFamily;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Random forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 15,
            min_samples_split: 5,
        }
    }
}

/// Gradient boosting hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 5,
            learning_rate: 0.1,
        }
    }
}

/// Settings for a single training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Regression family to fit
    pub family: ModelFamily,
    /// Fraction of the most recent rows held out for evaluation
    pub test_size: f64,
    pub forest: ForestParams,
    pub boosting: BoostingParams,
    /// Seed for bootstrap sampling
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            family: ModelFamily::default(),
            test_size: 0.2,
            forest: ForestParams::default(),
            boosting: BoostingParams::default(),
            seed: 42,
        }
    }
}

impl TrainConfig {
    /// Default settings for the given family
    pub fn new(family: ModelFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Set the regression family
    pub fn with_family(mut self, family: ModelFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the number of trees or boosting stages for both ensembles
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.forest.n_estimators = n_estimators;
        self.boosting.n_estimators = n_estimators;
        self
    }

    /// Set the random forest hyper-parameters
    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    /// Set the gradient boosting hyper-parameters
    pub fn with_boosting(mut self, boosting: BoostingParams) -> Self {
        self.boosting = boosting;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject settings that cannot produce a split or a model
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.forest.n_estimators == 0 || self.boosting.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Ensembles need at least one estimator".to_string(),
            ));
        }
        if !(self.boosting.learning_rate > 0.0 && self.boosting.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be in (0, 1], got {}",
                self.boosting.learning_rate
            )));
        }
        Ok(())
    }
}

/// Settings for an end-to-end forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Transaction CSV to read
    pub data_path: Option<PathBuf>,
    /// Days to forecast
    pub horizon: usize,
    /// Number of features in importance reports
    pub top_n: usize,
    /// Where to write or read the model artifact
    pub model_path: Option<PathBuf>,
    /// Where to write the forecast CSV
    pub output_path: Option<PathBuf>,
    pub train: TrainConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            horizon: 30,
            top_n: 10,
            model_path: None,
            output_path: None,
            train: TrainConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        config.train.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            ForecastError::ConfigError(format!(
                "Cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&text)
    }
}
