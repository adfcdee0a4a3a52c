//! Load-once prediction service over the serialized model artifact

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::encoder::{Column, FeatureSchema};

/// Serialized regression model, self-describing.
///
/// The artifact carries its own feature schema so the encoding and the
/// weights cannot drift apart: the weight count is checked against the
/// expanded schema width when the artifact is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub base_currency: String,
    pub columns: Vec<Column>,
    pub intercept: f64,
    pub weights: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model artifact {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact is inconsistent: {0}")]
    Inconsistent(String),

    #[error("feature vector has {got} slots, model expects {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("model produced a non-finite price")]
    NonFinite,
}

/// The loaded model. Created once at startup and shared behind an `Arc`
/// for the process lifetime.
#[derive(Debug)]
pub struct Predictor {
    schema: FeatureSchema,
    weights: Array1<f64>,
    intercept: f64,
    name: String,
    version: String,
    base_currency: String,
}

impl Predictor {
    /// Read and validate the artifact. Any failure here is a fatal
    /// configuration error: the server refuses to start without a model.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let schema = FeatureSchema {
            columns: artifact.columns,
        };

        let unknown = schema.unrecognized_columns();
        if !unknown.is_empty() {
            return Err(ModelError::Inconsistent(format!(
                "schema references unknown car attributes: {}",
                unknown.join(", ")
            )));
        }

        let width = schema.width();
        if artifact.weights.len() != width {
            return Err(ModelError::Inconsistent(format!(
                "{} weights for {} feature slots",
                artifact.weights.len(),
                width
            )));
        }

        if !artifact.intercept.is_finite()
            || artifact.weights.iter().any(|weight| !weight.is_finite())
        {
            return Err(ModelError::Inconsistent(
                "non-finite intercept or weight".to_string(),
            ));
        }

        Ok(Self {
            schema,
            weights: Array1::from_vec(artifact.weights),
            intercept: artifact.intercept,
            name: artifact.name,
            version: artifact.version,
            base_currency: artifact.base_currency,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn feature_width(&self) -> usize {
        self.weights.len()
    }

    /// `predict(features) -> price` in the model's base currency.
    ///
    /// The raw linear score is floored at zero: a price cannot be negative,
    /// and extreme but valid inputs can push the score below it.
    pub fn predict(&self, features: &Array1<f64>) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }

        let raw = self.intercept + self.weights.dot(features);
        if !raw.is_finite() {
            return Err(ModelError::NonFinite);
        }

        Ok(raw.max(0.0))
    }
}
