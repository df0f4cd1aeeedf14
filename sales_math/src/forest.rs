//! Random forest regression
//!
//! Trees are grown in parallel on bootstrap samples. Every tree draws from
//! its own generator seeded with `random_state + tree_index`, so the fitted
//! forest does not depend on thread scheduling.

use crate::tree::{DecisionTreeRegressor, FittedTree};
use crate::{check_training_shape, check_width, normalize, FittedRegressor, MathError, Regressor, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest regression family
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    bootstrap: bool,
    random_state: u64,
}

impl RandomForest {
    /// Create a forest of `n_estimators` unbounded trees
    pub fn new(n_estimators: usize) -> Result<Self> {
        if n_estimators == 0 {
            return Err(MathError::InvalidInput(
                "A forest needs at least one tree".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Random Forest (trees={})", n_estimators),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            random_state: 42,
        })
    }

    /// Set maximum depth of every tree
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
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

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set the base random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn tree_template(&self) -> DecisionTreeRegressor {
        let tree = DecisionTreeRegressor::new()
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf);
        match self.max_depth {
            Some(depth) => tree.with_max_depth(depth),
            None => tree,
        }
    }
}

impl Regressor for RandomForest {
    type Fitted = FittedRandomForest;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedRandomForest> {
        check_training_shape(x, y)?;

        let n_samples = x.nrows();
        let template = self.tree_template();

        let trees: Vec<FittedTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let indices: Vec<usize> = if self.bootstrap {
                    let seed = self.random_state.wrapping_add(tree_idx as u64);
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                template.fit_indices(x, y, indices)
            })
            .collect();

        let importances = average_importances(&trees, x.ncols());

        Ok(FittedRandomForest {
            trees,
            n_features: x.ncols(),
            importances,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Mean of the per-tree importances, ignoring trees that never split
pub(crate) fn average_importances(trees: &[FittedTree], n_features: usize) -> Vec<f64> {
    let mut total = vec![0.0; n_features];
    let mut counted = 0usize;
    for tree in trees.iter().filter(|t| t.nodes().len() > 1) {
        if let Some(imp) = tree.feature_importances() {
            for (acc, v) in total.iter_mut().zip(imp) {
                *acc += v;
            }
            counted += 1;
        }
    }

    if counted > 0 {
        for v in total.iter_mut() {
            *v /= counted as f64;
        }
    }
    normalize(&mut total);
    total
}

/// Fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRandomForest {
    trees: Vec<FittedTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl FittedRandomForest {
    /// The fitted trees
    pub fn trees(&self) -> &[FittedTree] {
        &self.trees
    }

    /// Check structural integrity, e.g. after deserialisation
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(MathError::InvalidInput("Forest has no trees".to_string()));
        }
        check_width(self.n_features, self.importances.len())?;
        for tree in &self.trees {
            check_width(self.n_features, tree.n_features())?;
            tree.validate()?;
        }
        Ok(())
    }
}

impl FittedRegressor for FittedRandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict_row(row);
        }
        sum / self.trees.len() as f64
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        check_width(self.n_features, x.ncols())?;
        let rows: Vec<f64> = x
            .outer_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|row| self.predict_row(row))
            .collect();
        Ok(Array1::from_vec(rows))
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}
