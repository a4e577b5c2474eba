//! Logistic model over the six forensic features

use std::{fs, path::Path};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Classifier, Prediction};
use crate::{
    error::{Error, Result},
    types::ClassifierFeatures,
};

const FEATURE_COUNT: usize = 6;

/// `sigmoid(bias + Σ wᵢ·xᵢ)` with features ordered ela, noise, compression,
/// font, metadata, forensic_risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    /// Reads a `{"weights": [...], "bias": b}` JSON model
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ClassifierUnavailable(format!("{}: {}", path.display(), e)))?;
        let model: LogisticClassifier = serde_json::from_str(&content)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(Error::ConfigError(format!(
                "logistic model needs {} weights, got {}",
                FEATURE_COUNT,
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::ConfigError("logistic model has non-finite parameters".into()));
        }
        Ok(())
    }

    pub fn probability(&self, features: &ClassifierFeatures) -> f64 {
        let z: f64 = self.bias
            + self
                .weights
                .iter()
                .zip(features.as_array())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self {
            weights: vec![1.2, 0.9, 1.6, 0.8, 1.1, 3.2],
            bias: -2.4,
        }
    }
}

#[async_trait]
impl Classifier for LogisticClassifier {
    async fn predict(&self, features: &ClassifierFeatures) -> Result<Prediction> {
        Ok(Prediction {
            probability: Some(self.probability(features)),
        })
    }

    fn name(&self) -> &str {
        "logistic"
    }
}
