//! Page scoring, document aggregation, fusion and the final risk gate
//! Author: kartik4091
//! Created: 2025-07-17 11:02:44 UTC

pub mod aggregator;
pub mod fusion;
pub mod gate;
pub mod page_scorer;

pub use aggregator::{DocumentAggregator, ElaGate, SignalSummary};
pub use fusion::ForensicRiskFusion;
pub use gate::{BlendOutcome, GateState, RiskCategory, RiskGate};
pub use page_scorer::{map_piecewise, region_term, PageScorer};
