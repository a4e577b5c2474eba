//! Clean-document gate, classifier blend and risk categorisation
//! Author: kartik4091
//! Created: 2025-07-18 09:47:31 UTC

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    classifier::{predict_bounded, Classifier},
    config::{ClassifierConfig, GateConfig},
    types::{ClassifierFeatures, SignalScores},
    utils::round_to,
};

/// Named risk bands of the 0-100 final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Clean Document")]
    CleanDocument,
    #[serde(rename = "Low Risk")]
    LowRisk,
    #[serde(rename = "Moderate Risk")]
    ModerateRisk,
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Very High Risk")]
    VeryHighRisk,
    #[serde(rename = "Critical Risk")]
    CriticalRisk,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::CleanDocument => "Clean Document",
            RiskCategory::LowRisk => "Low Risk",
            RiskCategory::ModerateRisk => "Moderate Risk",
            RiskCategory::HighRisk => "High Risk",
            RiskCategory::VeryHighRisk => "Very High Risk",
            RiskCategory::CriticalRisk => "Critical Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of the gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendOutcome {
    /// 0-100, two decimals
    pub final_score: f64,
    pub risk_category: RiskCategory,
    pub ml_probability: f64,
    pub classifier_invoked: bool,
}

/// States of one gate evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateState {
    CleanGate,
    MlInvoked { probability: f64 },
    MlSkipped,
    Categorized(BlendOutcome),
}

/// Applies the clean gate, consults the classifier and blends
#[derive(Debug, Clone, Copy)]
pub struct RiskGate {
    gate: GateConfig,
    classifier: ClassifierConfig,
}

impl RiskGate {
    pub fn new(gate: GateConfig, classifier: ClassifierConfig) -> Self {
        Self { gate, classifier }
    }

    /// Drives `CleanGate -> (MlInvoked | MlSkipped) -> Categorized`
    #[instrument(skip(self, scores, classifier))]
    pub async fn evaluate(
        &self,
        scores: &SignalScores,
        forensic_risk: f64,
        classifier: &dyn Classifier,
    ) -> BlendOutcome {
        let mut state = GateState::CleanGate;
        loop {
            debug!(?state, "gate transition");
            state = match state {
                GateState::CleanGate => {
                    if forensic_risk < self.gate.clean_gate {
                        GateState::MlSkipped
                    } else {
                        let features = ClassifierFeatures::new(scores, forensic_risk);
                        let probability =
                            predict_bounded(classifier, &features, &self.classifier).await;
                        GateState::MlInvoked { probability }
                    }
                }
                GateState::MlSkipped => GateState::Categorized(BlendOutcome {
                    final_score: 0.0,
                    risk_category: RiskCategory::CleanDocument,
                    ml_probability: 0.0,
                    classifier_invoked: false,
                }),
                GateState::MlInvoked { probability } => {
                    GateState::Categorized(self.categorize(forensic_risk, probability))
                }
                GateState::Categorized(outcome) => {
                    info!(
                        "🏷️ {} (score {:.2}, ml {:.3})",
                        outcome.risk_category, outcome.final_score, outcome.ml_probability
                    );
                    return outcome;
                }
            };
        }
    }

    /// Blends forensic risk with the classifier probability and bands the result
    pub fn categorize(&self, forensic_risk: f64, ml_probability: f64) -> BlendOutcome {
        let blended =
            self.gate.forensic_weight * forensic_risk + self.gate.ml_weight * ml_probability;
        let mut final_score = round_to((blended * 100.0).clamp(0.0, 100.0), 2);

        let risk_category = if final_score < self.gate.post_blend_floor {
            final_score = 0.0;
            RiskCategory::CleanDocument
        } else {
            self.band(final_score)
        };

        BlendOutcome {
            final_score,
            risk_category,
            ml_probability,
            classifier_invoked: true,
        }
    }

    pub fn band(&self, final_score: f64) -> RiskCategory {
        let g = &self.gate;
        if final_score < g.post_blend_floor {
            RiskCategory::CleanDocument
        } else if final_score < g.moderate_from {
            RiskCategory::LowRisk
        } else if final_score < g.high_from {
            RiskCategory::ModerateRisk
        } else if final_score < g.very_high_from {
            RiskCategory::HighRisk
        } else if final_score < g.critical_from {
            RiskCategory::VeryHighRisk
        } else {
            RiskCategory::CriticalRisk
        }
    }
}
