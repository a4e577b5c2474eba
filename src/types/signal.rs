//! Forensic signal identifiers and per-page outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image-derived forensic signals, one diagnostic directory each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Ela,
    Compression,
    Noise,
    Font,
}

impl Signal {
    pub const ALL: [Signal; 4] = [Signal::Ela, Signal::Compression, Signal::Noise, Signal::Font];

    /// Sub-directory of the forensics folder holding this signal's images
    pub fn dir_name(self) -> &'static str {
        match self {
            Signal::Ela => "ELA",
            Signal::Compression => "Compression",
            Signal::Noise => "Noise",
            Signal::Font => "Font_Alignment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Ela => "ela",
            Signal::Compression => "compression",
            Signal::Noise => "noise",
            Signal::Font => "font",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a page was treated as near-blank
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowContentReason {
    SparseActivity { active_fraction: f64 },
    TooFewPixels { count: usize },
    TooFewPatches { count: usize },
    LowEnergy { median: f64, ratio: f64 },
}

impl fmt::Display for LowContentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowContentReason::SparseActivity { active_fraction } => {
                write!(f, "active fraction {:.4}", active_fraction)
            }
            LowContentReason::TooFewPixels { count } => write!(f, "{} qualifying pixels", count),
            LowContentReason::TooFewPatches { count } => write!(f, "{} qualifying patches", count),
            LowContentReason::LowEnergy { median, ratio } => {
                write!(f, "low energy (median {:.4}, ratio {:.4})", median, ratio)
            }
        }
    }
}

/// Bounding box and severity of one surviving high-residual region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSeverity {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// `0.7 * mean energy + 0.3 * min(1, area_ratio * area_gain)`
    pub severity: f64,
}

/// Internal per-page severity details, never persisted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageDiagnostics {
    /// Tail/outlier metric the score was mapped from
    pub metric: f64,
    pub region_count: usize,
    pub largest_region_ratio: f64,
    /// Largest region first
    pub regions: Vec<RegionSeverity>,
}

/// Typed result of scoring one page for one signal
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Scored { score: f64, diagnostics: PageDiagnostics },
    /// Contributes an explicit zero
    LowContent(LowContentReason),
    /// Excluded from the document's page list
    Skipped { reason: String },
}

impl PageOutcome {
    /// Score this page contributes to aggregation, `None` when excluded
    pub fn contribution(&self) -> Option<f64> {
        match self {
            PageOutcome::Scored { score, .. } => Some(*score),
            PageOutcome::LowContent(_) => Some(0.0),
            PageOutcome::Skipped { .. } => None,
        }
    }
}

/// Document-level score per signal, all in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalScores {
    pub ela: f64,
    pub compression: f64,
    pub noise: f64,
    pub font: f64,
    pub metadata: f64,
}

/// Fixed-field feature record handed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierFeatures {
    pub ela_score: f64,
    pub noise_score: f64,
    pub compression_score: f64,
    pub font_score: f64,
    pub metadata_score: f64,
    pub forensic_risk: f64,
}

impl ClassifierFeatures {
    pub fn new(scores: &SignalScores, forensic_risk: f64) -> Self {
        Self {
            ela_score: scores.ela,
            noise_score: scores.noise,
            compression_score: scores.compression,
            font_score: scores.font,
            metadata_score: scores.metadata,
            forensic_risk,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.ela_score,
            self.noise_score,
            self.compression_score,
            self.font_score,
            self.metadata_score,
            self.forensic_risk,
        ]
    }
}
