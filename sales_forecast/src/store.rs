//! Versioned model artifacts
//!
//! An artifact is a JSON document holding the family tag, the fitted
//! parameters, the ordered training feature names and the importance vector
//! when the family has one. Floats are written with round-trip precision,
//! so a reloaded model predicts bit-for-bit like the one that was saved.

use crate::error::{ForecastError, Result};
use crate::model::{FittedModel, ModelFamily, TrainedModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Format tag written into every artifact
pub const ARTIFACT_FORMAT: &str = "sales-forecast-model";

/// Current artifact layout version
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct ArtifactHeader {
    format: String,
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct Artifact {
    format: String,
    version: u32,
    family: ModelFamily,
    feature_names: Vec<String>,
    importances: Option<Vec<f64>>,
    model: FittedModel,
}

fn corrupt(reason: impl Into<String>) -> ForecastError {
    ForecastError::CorruptArtifact(reason.into())
}

/// Encode a trained model as an artifact blob
pub fn to_bytes(model: &TrainedModel) -> Result<Vec<u8>> {
    let artifact = Artifact {
        format: ARTIFACT_FORMAT.to_string(),
        version: ARTIFACT_VERSION,
        family: model.family(),
        feature_names: model.feature_names().to_vec(),
        importances: model.fitted().feature_importances().map(<[f64]>::to_vec),
        model: model.fitted().clone(),
    };
    serde_json::to_vec_pretty(&artifact)
        .map_err(|e| ForecastError::InvalidInput(format!("Cannot encode model: {}", e)))
}

/// Decode and validate an artifact blob
pub fn from_bytes(bytes: &[u8]) -> Result<TrainedModel> {
    let header: ArtifactHeader =
        serde_json::from_slice(bytes).map_err(|e| corrupt(format!("Malformed artifact: {}", e)))?;
    if header.format != ARTIFACT_FORMAT {
        return Err(corrupt(format!("Unknown artifact format '{}'", header.format)));
    }
    if header.version != ARTIFACT_VERSION {
        return Err(corrupt(format!(
            "Unsupported artifact version {} (expected {})",
            header.version, ARTIFACT_VERSION
        )));
    }

    let artifact: Artifact =
        serde_json::from_slice(bytes).map_err(|e| corrupt(format!("Malformed artifact: {}", e)))?;

    if artifact.family != artifact.model.family() {
        return Err(corrupt(format!(
            "Family tag {} does not match {} parameters",
            artifact.family,
            artifact.model.family()
        )));
    }
    artifact.model.validate()?;
    if artifact.importances.as_deref() != artifact.model.feature_importances() {
        return Err(corrupt("Importance vector does not match model parameters"));
    }

    TrainedModel::new(artifact.model, artifact.feature_names).map_err(|e| corrupt(e.to_string()))
}

/// Write a trained model artifact to `path`
pub fn save_model<P: AsRef<Path>>(model: &TrainedModel, path: P) -> Result<()> {
    let bytes = to_bytes(model)?;
    fs::write(path.as_ref(), bytes)?;
    info!(path = %path.as_ref().display(), family = %model.family(), "Model saved");
    Ok(())
}

/// Read a trained model artifact from `path`
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
    let bytes = fs::read(path.as_ref())?;
    let model = from_bytes(&bytes)?;
    info!(path = %path.as_ref().display(), family = %model.family(), "Model loaded");
    Ok(model)
}
