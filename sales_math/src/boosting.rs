//! Least-squares gradient boosting of shallow regression trees
//!
//! Boosting starts from the mean target and adds one tree per stage, each
//! fitted on the current residuals and shrunk by the learning rate.

use crate::forest::average_importances;
use crate::tree::{DecisionTreeRegressor, FittedTree};
use crate::{check_training_shape, check_width, FittedRegressor, MathError, Regressor, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Gradient boosting regression family
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    name: String,
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl GradientBoosting {
    /// Create a booster with `n_estimators` stages and the given learning rate
    pub fn new(n_estimators: usize, learning_rate: f64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "Boosting needs at least one stage".to_string(),
            ));
        }
        if !(learning_rate > 0.0 && learning_rate <= 1.0) {
            return Err(MathError::InvalidInput(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            name: format!(
                "Gradient Boosting (stages={}, learning_rate={})",
                n_estimators, learning_rate
            ),
            n_estimators,
            learning_rate,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
        })
    }

    /// Set maximum depth of every stage's tree
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples required to split a node
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in each leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }
}

impl Regressor for GradientBoosting {
    type Fitted = FittedGradientBoosting;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedGradientBoosting> {
        check_training_shape(x, y)?;

        let template = DecisionTreeRegressor::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);

        let n_samples = x.nrows();
        let init = y.sum() / n_samples as f64;
        let mut current = Array1::from_elem(n_samples, init);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals = y - &current;
            let tree = template.fit_indices(x, &residuals, (0..n_samples).collect());
            for (value, row) in current.iter_mut().zip(x.outer_iter()) {
                *value += self.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        let importances = average_importances(&trees, x.ncols());

        Ok(FittedGradientBoosting {
            init,
            learning_rate: self.learning_rate,
            trees,
            n_features: x.ncols(),
            importances,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted gradient boosting ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedGradientBoosting {
    init: f64,
    learning_rate: f64,
    trees: Vec<FittedTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl FittedGradientBoosting {
    /// Initial prediction (mean of the training target)
    pub fn init(&self) -> f64 {
        self.init
    }

    /// The fitted stage trees
    pub fn trees(&self) -> &[FittedTree] {
        &self.trees
    }

    /// Check structural integrity, e.g. after deserialisation
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(MathError::InvalidInput("Booster has no stages".to_string()));
        }
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err(MathError::InvalidInput(
                "Booster parameters are not finite".to_string(),
            ));
        }
        check_width(self.n_features, self.importances.len())?;
        for tree in &self.trees {
            check_width(self.n_features, tree.n_features())?;
            tree.validate()?;
        }
        Ok(())
    }
}

impl FittedRegressor for FittedGradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut value = self.init;
        for tree in &self.trees {
            value += self.learning_rate * tree.predict_row(row);
        }
        value
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}
