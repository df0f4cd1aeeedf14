//! Ordinary least squares regression with an intercept
//!
//! The design matrix is centred and each column scaled to unit norm before
//! the normal equations are solved. Constant columns carry no information
//! and receive a zero coefficient. Rank-deficient designs are solved with a
//! small diagonal jitter added to the Cholesky factorisation.

use crate::{check_training_shape, FittedRegressor, MathError, Regressor, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

const MAX_JITTER_ATTEMPTS: usize = 8;
const INITIAL_JITTER: f64 = 1e-12;

/// Linear regression family (OLS with intercept)
#[derive(Debug, Clone)]
pub struct LinearRegression {
    name: String,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    /// Create a new linear regression family
    pub fn new() -> Self {
        Self {
            name: "Linear Regression".to_string(),
        }
    }
}

/// Fitted linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl FittedLinearRegression {
    /// Build a model from known parameters
    pub fn from_parts(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Get the fitted coefficients, one per feature
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Get the fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    type Fitted = FittedLinearRegression;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedLinearRegression> {
        check_training_shape(x, y)?;

        let n_features = x.ncols();
        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| MathError::InsufficientData("Empty design matrix".to_string()))?;
        let y_mean = y
            .mean()
            .ok_or_else(|| MathError::InsufficientData("Empty target".to_string()))?;

        let x_centered = x - &x_mean;
        let y_centered = y.mapv(|v| v - y_mean);

        let norms: Vec<f64> = x_centered
            .axis_iter(Axis(1))
            .map(|col| col.dot(&col).sqrt())
            .collect();
        let active: Vec<usize> = (0..n_features).filter(|&j| norms[j] > 0.0).collect();

        let mut coefficients = vec![0.0; n_features];
        if !active.is_empty() {
            let z = Array2::from_shape_fn((x.nrows(), active.len()), |(i, k)| {
                x_centered[[i, active[k]]] / norms[active[k]]
            });
            let ztz = z.t().dot(&z);
            let zty = z.t().dot(&y_centered);
            let weights = solve_normal_equations(&ztz, &zty)?;

            for (k, &j) in active.iter().enumerate() {
                coefficients[j] = weights[k] / norms[j];
            }
        }

        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_mean.iter())
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(FittedLinearRegression {
            coefficients,
            intercept,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedRegressor for FittedLinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut value = self.intercept;
        for (c, x) in self.coefficients.iter().zip(row.iter()) {
            value += c * x;
        }
        value
    }
}

/// Solve the symmetric positive semi-definite system `a * w = b`
fn solve_normal_equations(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let mut jitter = 0.0;
    for _ in 0..MAX_JITTER_ATTEMPTS {
        if let Some(solution) = cholesky_solve(a, b, jitter) {
            return Ok(solution);
        }
        jitter = if jitter == 0.0 {
            INITIAL_JITTER
        } else {
            jitter * 100.0
        };
    }

    Err(MathError::CalculationError(
        "Normal equations are singular even after regularisation".to_string(),
    ))
}

/// Cholesky solve with `jitter` added to the diagonal, `None` if not positive definite
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>, jitter: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    let tolerance = f64::EPSILON * n as f64;
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] + jitter - sum;
                if !(diag > tolerance) {
                    return None;
                }
                l[[i, i]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * w = y
    let mut w = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * w[j];
        }
        w[i] = (y[i] - sum) / l[[i, i]];
    }

    if w.iter().all(|v| v.is_finite()) {
        Some(w)
    } else {
        None
    }
}
