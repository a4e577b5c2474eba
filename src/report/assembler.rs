//! Builds the final report from the fused scores and gate outcome

use chrono::Utc;
use tracing::debug;

use super::{Components, FinalReport, FinalResult, ForensicsComponent, MlComponent};
use crate::{scoring::BlendOutcome, types::SignalScores, utils::round_to};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Sub-scores rounded to 3 decimals, the final score to 2
    pub fn assemble(
        &self,
        record_id: u64,
        forensics_folder: &str,
        scores: &SignalScores,
        forensic_risk: f64,
        outcome: &BlendOutcome,
    ) -> FinalReport {
        let report = FinalReport {
            record_id,
            timestamp: Utc::now(),
            forensics_folder: forensics_folder.to_string(),
            final_result: FinalResult {
                final_score: round_to(outcome.final_score, 2),
                risk_category: outcome.risk_category,
            },
            components: Components {
                forensics: ForensicsComponent {
                    ela_score: round_to(scores.ela, 3),
                    noise_score: round_to(scores.noise, 3),
                    compression_score: round_to(scores.compression, 3),
                    font_score: round_to(scores.font, 3),
                    metadata_score: round_to(scores.metadata, 3),
                    forensic_risk: round_to(forensic_risk, 3),
                },
                ml: MlComponent {
                    ml_probability: round_to(outcome.ml_probability, 3),
                },
            },
        };
        debug!(record_id, "report assembled");
        report
    }
}
