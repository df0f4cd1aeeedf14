//! Model families and the trained model artifact

use crate::config::TrainConfig;
use crate::error::{ForecastError, Result};
use crate::features::FeatureMatrix;
use ndarray::{Array1, Array2};
use sales_math::{
    FittedGradientBoosting, FittedLinearRegression, FittedRandomForest, FittedRegressor,
    GradientBoosting, LinearRegression, RandomForest, Regressor,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Supported regression families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Ordinary least squares with intercept
    Linear,
    /// Bootstrap-aggregated regression trees
    #[default]
    RandomForest,
    /// Least-squares boosting of shallow regression trees
    GradientBoosting,
}

impl ModelFamily {
    /// Identifier used in configuration files and artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Linear => "linear",
            ModelFamily::RandomForest => "random_forest",
            ModelFamily::GradientBoosting => "gradient_boosting",
        }
    }

    /// Whether fitted models of this family report feature importance
    pub fn has_importance(&self) -> bool {
        !matches!(self, ModelFamily::Linear)
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "linear_regression" => Ok(ModelFamily::Linear),
            "random_forest" | "rf" => Ok(ModelFamily::RandomForest),
            "gradient_boosting" | "gbm" => Ok(ModelFamily::GradientBoosting),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown model family '{}'",
                other
            ))),
        }
    }
}

/// A fitted model of any supported family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", content = "params", rename_all = "snake_case")]
pub enum FittedModel {
    Linear(FittedLinearRegression),
    RandomForest(FittedRandomForest),
    GradientBoosting(FittedGradientBoosting),
}

impl FittedModel {
    /// Fit the configured family on `x` against `y`
    pub fn fit(config: &TrainConfig, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let model = match config.family {
            ModelFamily::Linear => {
                let family = LinearRegression::new();
                debug!(model = family.name(), "Fitting");
                FittedModel::Linear(family.fit(x, y)?)
            }
            ModelFamily::RandomForest => {
                let params = &config.forest;
                let family = RandomForest::new(params.n_estimators)?
                    .with_max_depth(params.max_depth)
                    .with_min_samples_split(params.min_samples_split)
                    .with_random_state(config.seed);
                debug!(model = family.name(), "Fitting");
                FittedModel::RandomForest(family.fit(x, y)?)
            }
            ModelFamily::GradientBoosting => {
                let params = &config.boosting;
                let family = GradientBoosting::new(params.n_estimators, params.learning_rate)?
                    .with_max_depth(params.max_depth);
                debug!(model = family.name(), "Fitting");
                FittedModel::GradientBoosting(family.fit(x, y)?)
            }
        };
        Ok(model)
    }

    /// Family of the fitted model
    pub fn family(&self) -> ModelFamily {
        match self {
            FittedModel::Linear(_) => ModelFamily::Linear,
            FittedModel::RandomForest(_) => ModelFamily::RandomForest,
            FittedModel::GradientBoosting(_) => ModelFamily::GradientBoosting,
        }
    }

    fn regressor(&self) -> &dyn FittedRegressor {
        match self {
            FittedModel::Linear(m) => m,
            FittedModel::RandomForest(m) => m,
            FittedModel::GradientBoosting(m) => m,
        }
    }

    pub fn n_features(&self) -> usize {
        self.regressor().n_features()
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.regressor().predict(x)?)
    }

    /// Per-feature importance in column order, if the family has one
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.regressor().feature_importances()
    }

    /// Check structural integrity after deserialisation
    pub fn validate(&self) -> Result<()> {
        match self {
            FittedModel::Linear(m) => {
                let finite = m.intercept().is_finite() && m.coefficients().iter().all(|c| c.is_finite());
                if !finite {
                    return Err(ForecastError::CorruptArtifact(
                        "Linear parameters are not finite".to_string(),
                    ));
                }
                Ok(())
            }
            FittedModel::RandomForest(m) => m
                .validate()
                .map_err(|e| ForecastError::CorruptArtifact(e.to_string())),
            FittedModel::GradientBoosting(m) => m
                .validate()
                .map_err(|e| ForecastError::CorruptArtifact(e.to_string())),
        }
    }
}

/// A fitted model bound to the ordered feature names it was trained on
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    model: FittedModel,
    feature_names: Vec<String>,
}

impl TrainedModel {
    /// Pair a fitted model with its training feature names
    pub fn new(model: FittedModel, feature_names: Vec<String>) -> Result<Self> {
        if model.n_features() != feature_names.len() {
            return Err(ForecastError::InvalidInput(format!(
                "Model has {} inputs but {} feature names were given",
                model.n_features(),
                feature_names.len()
            )));
        }
        Ok(Self {
            model,
            feature_names,
        })
    }

    /// Fit the configured family on a named feature matrix
    pub fn fit(config: &TrainConfig, features: &FeatureMatrix, target: &Array1<f64>) -> Result<Self> {
        let model = FittedModel::fit(config, features.data(), target)?;
        Self::new(model, features.names().to_vec())
    }

    pub fn family(&self) -> ModelFamily {
        self.model.family()
    }

    /// Feature names in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The underlying fitted model
    pub fn fitted(&self) -> &FittedModel {
        &self.model
    }

    /// Predict every row of `features`
    ///
    /// The matrix must carry exactly the training feature names in training
    /// order. Columns are never reordered to match.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Array1<f64>> {
        if features.names() != self.feature_names.as_slice() {
            return Err(ForecastError::FeatureSchemaMismatch {
                expected: self.feature_names.clone(),
                actual: features.names().to_vec(),
            });
        }
        self.model.predict(features.data())
    }

    /// Importance of each feature in training order, if available
    pub fn importances(&self) -> Option<Vec<(String, f64)>> {
        self.model.feature_importances().map(|values| {
            self.feature_names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect()
        })
    }
}
