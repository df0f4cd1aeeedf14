//! Feature importance reporting

use crate::error::{ForecastError, Result};
use crate::model::{ModelFamily, TrainedModel};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ranked feature importance, or the family's lack of one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "features", rename_all = "snake_case")]
pub enum FeatureImportance {
    /// `(feature, importance)` pairs, most important first
    Available(Vec<(String, f64)>),
    /// The family does not define importance
    Unavailable(ModelFamily),
}

impl FeatureImportance {
    /// Ranked pairs, or `None` when unavailable
    pub fn ranked(&self) -> Option<&[(String, f64)]> {
        match self {
            FeatureImportance::Available(pairs) => Some(pairs),
            FeatureImportance::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FeatureImportance::Available(_))
    }
}

impl fmt::Display for FeatureImportance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureImportance::Available(pairs) => {
                writeln!(f, "Feature importance:")?;
                for (rank, (name, value)) in pairs.iter().enumerate() {
                    writeln!(f, "  {:>2}. {:<18} {:.4}", rank + 1, name, value)?;
                }
                Ok(())
            }
            FeatureImportance::Unavailable(family) => {
                write!(f, "Feature importance is not available for {} models", family)
            }
        }
    }
}

/// Top `top_n` features by importance
pub fn feature_importance(model: &TrainedModel, top_n: usize) -> Result<FeatureImportance> {
    if top_n == 0 {
        return Err(ForecastError::InvalidParameter(
            "top_n must be at least 1".to_string(),
        ));
    }

    let Some(mut pairs) = model.importances() else {
        return Ok(FeatureImportance::Unavailable(model.family()));
    };

    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    pairs.truncate(top_n);
    Ok(FeatureImportance::Available(pairs))
}
