//! Rule-based fusion of the five document signals into forensic risk

use tracing::debug;

use crate::{config::FusionWeights, types::SignalScores, utils::round_to};

/// Fixed, non-learned weighted combination
#[derive(Debug, Clone, Copy)]
pub struct ForensicRiskFusion {
    weights: FusionWeights,
}

impl ForensicRiskFusion {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    /// Monotone non-decreasing in every input, bounded to [0,1]
    pub fn fuse(&self, scores: &SignalScores) -> f64 {
        let inputs = [
            scores.ela,
            scores.compression,
            scores.noise,
            scores.font,
            scores.metadata,
        ];
        let risk: f64 = self
            .weights
            .as_array()
            .iter()
            .zip(inputs)
            .map(|(w, s)| w.max(0.0) * sanitize(s))
            .sum();

        let risk = round_to(risk.clamp(0.0, 1.0), 3);
        debug!(?scores, forensic_risk = risk, "forensic risk fused");
        risk
    }
}

fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
