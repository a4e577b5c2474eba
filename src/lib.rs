//! Main Library File for Statement Tamper-Risk Scoring
//! Provides a staged, pipeline-based architecture that turns per-page
//! forensic diagnostic images and PDF metadata into a calibrated risk report.

// Configuration and Core Pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Stage 2: Diagnostic image statistics
pub mod analyzer;

// Stage 2-6: Page scoring, aggregation, fusion and gating
pub mod scoring;

// Stage 1-2: Folder layout and per-signal scoring
pub mod forensics;

// Stage 4: Metadata scoring
pub mod metadata;

// Stage 6: Soft-signal classifier
pub mod classifier;

// Stage 7: Report Generation
pub mod report;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use classifier::{Classifier, FixedClassifier, LogisticClassifier};
pub use config::ScoringConfig;
pub use error::{Error, Result};
pub use pipeline::{AnalysisRequest, Pipeline, ScoringOutcome};
pub use report::{FinalReport, ReportAssembler, ReportWriter};
pub use scoring::{BlendOutcome, RiskCategory, RiskGate};
pub use types::{DocumentId, Signal, SignalScores};
pub use utils::Metrics;
