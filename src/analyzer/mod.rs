//! Diagnostic image analysis
//! Author: kartik4091
//! Created: 2025-07-15 08:36:15 UTC
//!
//! Statistics extraction over per-page diagnostic images: robust order
//! statistics, patch grids, edge masks and high-residual region geometry.

pub mod edge_mask;
pub mod image_stats;
pub mod regions;
pub mod robust;

pub use self::{
    edge_mask::EdgeMask,
    image_stats::{DiagnosticImage, DiagnosticImageStats, FeatureVector, PageStats, PatchStats},
    regions::{Region, RegionStats},
};
