//! Trailing-window statistics
//!
//! The window grows until it reaches its full size and then slides, so a
//! value is available as soon as one observation has been pushed.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Mean over the last `window` observations (fewer while warming up)
#[derive(Debug, Clone)]
pub struct TrailingMean {
    window: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl TrailingMean {
    /// Create a new trailing mean with the specified window
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        })
    }

    /// Push a new observation
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.window {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Current mean over the available observations
    pub fn value(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(MathError::InsufficientData(
                "No observations pushed to trailing mean".to_string(),
            ));
        }

        Ok(self.sum / self.values.len() as f64)
    }

    /// Get the configured window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether the window has filled up
    pub fn is_full(&self) -> bool {
        self.values.len() == self.window
    }

    /// Clear all observations
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Compute the trailing mean at every position of `values`
pub fn trailing_means(values: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut mean = TrailingMean::new(window)?;
    values
        .iter()
        .map(|&v| {
            mean.update(v);
            mean.value()
        })
        .collect()
}
