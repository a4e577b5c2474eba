//! Forensics module: diagnostic output layout and per-signal page scoring
//! Created: 2025-06-03 16:06:58 UTC
//! Author: kartik4091

pub mod layout;
pub mod signal_scorer;

pub use layout::{list_pages, ForensicsLayout, PREPROCESSED_DIR};
pub use signal_scorer::{ScoredPage, SignalRun, SignalScorer};
