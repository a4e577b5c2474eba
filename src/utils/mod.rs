//! Utility Module Implementation
//! Author: kartik4091
//! Created: 2025-06-03 09:14:13 UTC
//!
//! Shared helpers: logging setup, pipeline metrics and score rounding.

pub mod logger;
pub mod metrics;

pub use self::{
    logger::{init_logging, LogLevel},
    metrics::{Metrics, MetricsSnapshot},
};

/// Rounds half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
