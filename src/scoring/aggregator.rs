//! Document-level reduction of page scores

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GateConfig,
    types::{PageOutcome, Signal},
    utils::round_to,
};

/// Document score for one signal plus page bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub signal: Signal,
    pub score: f64,
    pub pages_scored: usize,
    pub pages_low_content: usize,
    pub pages_skipped: usize,
    pub directory_present: bool,
}

impl SignalSummary {
    /// Summary for a signal whose directory is absent
    pub fn missing(signal: Signal) -> Self {
        Self {
            signal,
            score: 0.0,
            pages_scored: 0,
            pages_low_content: 0,
            pages_skipped: 0,
            directory_present: false,
        }
    }
}

/// Max-reduction over pages: one tampered page is never diluted by clean ones
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAggregator;

impl DocumentAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, signal: Signal, outcomes: &[PageOutcome]) -> SignalSummary {
        let mut summary = SignalSummary {
            directory_present: true,
            ..SignalSummary::missing(signal)
        };

        let mut best: Option<f64> = None;
        for outcome in outcomes {
            match outcome {
                PageOutcome::Scored { .. } => summary.pages_scored += 1,
                PageOutcome::LowContent(_) => summary.pages_low_content += 1,
                PageOutcome::Skipped { .. } => summary.pages_skipped += 1,
            }
            if let Some(score) = outcome.contribution() {
                best = Some(best.map_or(score, |b: f64| b.max(score)));
            }
        }

        summary.score = round_to(best.unwrap_or(0.0).clamp(0.0, 1.0), 3);
        debug!(
            signal = %signal,
            score = summary.score,
            scored = summary.pages_scored,
            low_content = summary.pages_low_content,
            skipped = summary.pages_skipped,
            "signal aggregated"
        );
        summary
    }
}

/// Compression evidence gating the ELA signal
#[derive(Debug, Clone, Copy)]
pub struct ElaGate {
    off_below: f64,
    full_from: f64,
    partial_weight: f64,
}

impl ElaGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            off_below: config.ela_gate_off_below,
            full_from: config.ela_full_from,
            partial_weight: config.ela_partial_weight,
        }
    }

    pub fn weight(&self, compression: f64) -> f64 {
        if compression < self.off_below {
            0.0
        } else if compression < self.full_from {
            self.partial_weight
        } else {
            1.0
        }
    }

    /// Gated ELA document score: `raw_ela × weight(compression)`
    pub fn apply(&self, raw_ela: f64, compression: f64) -> f64 {
        round_to((raw_ela * self.weight(compression)).clamp(0.0, 1.0), 3)
    }
}
