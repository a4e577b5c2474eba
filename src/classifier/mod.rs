//! Soft-signal classifier seam
//! Author: kartik4091
//! Created: 2025-07-18 16:20:03 UTC
//!
//! The learned model is an external collaborator. The pipeline only relies
//! on the `Classifier` trait and calls it through `predict_bounded`, which
//! never fails: errors, timeouts and missing probabilities fall back to the
//! configured default.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{config::ClassifierConfig, error::Result, types::ClassifierFeatures};

pub mod logistic;

pub use logistic::LogisticClassifier;

/// Raw classifier response; `probability` may be absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: Option<f64>,
}

/// Opaque feature record -> probability model
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, features: &ClassifierFeatures) -> Result<Prediction>;

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Classifier answering with a constant, useful when no model is deployed
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClassifier {
    probability: Option<f64>,
}

impl FixedClassifier {
    pub fn new(probability: Option<f64>) -> Self {
        Self { probability }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn predict(&self, _features: &ClassifierFeatures) -> Result<Prediction> {
        Ok(Prediction {
            probability: self.probability,
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Scoped, time-bounded classifier call with a default on any failure
#[instrument(skip(classifier, features, config), fields(classifier = classifier.name()))]
pub async fn predict_bounded(
    classifier: &dyn Classifier,
    features: &ClassifierFeatures,
    config: &ClassifierConfig,
) -> f64 {
    let fallback = config.fallback_probability;
    match tokio::time::timeout(config.timeout(), classifier.predict(features)).await {
        Ok(Ok(Prediction { probability: Some(p) })) if p.is_finite() => {
            debug!(probability = p, "classifier answered");
            p.clamp(0.0, 1.0)
        }
        Ok(Ok(_)) => {
            debug!(fallback, "classifier returned no usable probability");
            fallback
        }
        Ok(Err(err)) => {
            warn!("⚠️ classifier unavailable: {}", err);
            fallback
        }
        Err(_) => {
            warn!("⚠️ classifier timed out after {}ms", config.timeout_ms);
            fallback
        }
    }
}
