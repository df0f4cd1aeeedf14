//! CART regression tree with a squared-error criterion
//!
//! Nodes live in a flat arena; children are always stored after their
//! parent, so walking from node 0 terminates.

use crate::{check_training_shape, normalize, FittedRegressor, MathError, Regressor, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// A node of a fitted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node holding the mean target of its samples
    Leaf { value: f64 },
    /// Internal node sending `x[feature] <= threshold` to `left`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Regression tree family
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    name: String,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    /// Create an unbounded tree that splits down to single samples
    pub fn new() -> Self {
        Self {
            name: "Decision Tree".to_string(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples required to split a node
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in each leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    /// Fit on the rows of `x` listed in `indices` (repetitions allowed)
    pub(crate) fn fit_indices(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        mut indices: Vec<usize>,
    ) -> FittedTree {
        let mut grower = Grower {
            config: self,
            x,
            y,
            nodes: Vec::new(),
            importances: vec![0.0; x.ncols()],
        };
        grower.grow(&mut indices, 0);

        let mut importances = grower.importances;
        normalize(&mut importances);

        FittedTree {
            nodes: grower.nodes,
            n_features: x.ncols(),
            importances,
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    type Fitted = FittedTree;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedTree> {
        check_training_shape(x, y)?;
        Ok(self.fit_indices(x, y, (0..x.nrows()).collect()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    importances: Vec<f64>,
}

impl FittedTree {
    /// Nodes in arena order, root first
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], id: usize) -> usize {
            match &nodes[id] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Check structural integrity, e.g. after deserialisation
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(MathError::InvalidInput("Tree has no nodes".to_string()));
        }
        if self.importances.len() != self.n_features {
            return Err(MathError::ShapeMismatch {
                expected: self.n_features,
                actual: self.importances.len(),
            });
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(MathError::InvalidInput(format!(
                        "Leaf {} holds a non-finite value",
                        id
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(MathError::InvalidInput(format!(
                            "Node {} splits on feature {} of {}",
                            id, feature, self.n_features
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(MathError::InvalidInput(format!(
                                "Node {} points to invalid child {}",
                                id, child
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl FittedRegressor for FittedTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    left_count: usize,
    gain: f64,
}

struct Grower<'a> {
    config: &'a DecisionTreeRegressor,
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

impl Grower<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: sum / n as f64,
        });

        let first = self.y[indices[0]];
        let pure = indices.iter().all(|&i| self.y[i] == first);
        let should_stop = pure
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || self.config.max_depth.map_or(false, |d| depth >= d);
        if should_stop {
            return id;
        }

        let Some(split) = self.best_split(indices, sum) else {
            return id;
        };
        self.importances[split.feature] += split.gain;

        indices.sort_by(|&a, &b| {
            self.x[[a, split.feature]].total_cmp(&self.x[[b, split.feature]])
        });
        let (left_indices, right_indices) = indices.split_at_mut(split.left_count);

        let left = self.grow(left_indices, depth + 1);
        let right = self.grow(right_indices, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Best squared-error reduction over every feature and cut point
    fn best_split(&self, indices: &[usize], total: f64) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        let parent_score = total * total / n as f64;
        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in 0..self.x.ncols() {
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left_sum = 0.0;
            for pos in 1..n {
                left_sum += self.y[order[pos - 1]];
                let lo = self.x[[order[pos - 1], feature]];
                let hi = self.x[[order[pos], feature]];
                if pos < min_leaf || n - pos < min_leaf || lo == hi {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / pos as f64
                    + right_sum * right_sum / (n - pos) as f64;
                let gain = score - parent_score;
                if gain <= 0.0 || best.as_ref().map_or(false, |b| gain <= b.gain) {
                    continue;
                }

                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid >= hi { lo } else { mid };
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    left_count: pos,
                    gain,
                });
            }
        }

        best
    }
}
