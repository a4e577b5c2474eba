//! Page-level anomaly scoring
//! Author: kartik4091
//! Created: 2025-07-17 11:05:52 UTC
//!
//! Maps a page's feature vector to a score in [0,1]: low-content guard,
//! tail/outlier metric, piecewise-linear calibration, and for region-based
//! signals a blend with region count, energy and area terms.

use tracing::trace;

use crate::{
    analyzer::{FeatureVector, PageStats, RegionStats},
    config::{Breakpoints, MetricKind, RegionBlend, SignalConfig},
    types::{LowContentReason, PageDiagnostics, PageOutcome, RegionSeverity, Signal},
};

/// Scores pages of one signal
#[derive(Debug, Clone)]
pub struct PageScorer {
    signal: Signal,
    config: SignalConfig,
}

impl PageScorer {
    pub fn new(signal: Signal, config: SignalConfig) -> Self {
        Self { signal, config }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn score(&self, stats: &PageStats) -> PageOutcome {
        match stats {
            PageStats::LowContent(reason) => PageOutcome::LowContent(*reason),
            PageStats::Features(features) => self.score_features(features),
        }
    }

    fn score_features(&self, features: &FeatureVector) -> PageOutcome {
        let metric = self.metric(features);

        if let (Some(guard), Some(patches)) = (self.config.low_energy_guard, features.patches) {
            if patches.median < guard.max_median && metric < guard.max_ratio {
                return PageOutcome::LowContent(LowContentReason::LowEnergy {
                    median: patches.median,
                    ratio: metric,
                });
            }
        }

        let tail = map_piecewise(metric, &self.config.breakpoints);
        let (score, region_count, largest_region_ratio, regions) = match &self.config.region_blend {
            Some(blend) => {
                let region = features.regions.as_ref().map_or(0.0, |r| region_term(r, blend));
                (
                    (1.0 - blend.weight) * tail + blend.weight * region,
                    features.regions.as_ref().map_or(0, RegionStats::count),
                    features.regions.as_ref().map_or(0.0, |r| r.largest_area_ratio),
                    features.regions.as_ref().map_or_else(Vec::new, |r| {
                        region_severities(r, features.total_pixels, blend)
                    }),
                )
            }
            None => (tail, 0, 0.0, Vec::new()),
        };

        trace!(
            signal = %self.signal,
            metric,
            tail,
            score,
            region_count,
            "page scored"
        );

        PageOutcome::Scored {
            score: score.clamp(0.0, 1.0),
            diagnostics: PageDiagnostics {
                metric,
                region_count,
                largest_region_ratio,
                regions,
            },
        }
    }

    fn metric(&self, features: &FeatureVector) -> f64 {
        match self.config.metric {
            MetricKind::PatchOutlierRatio => features.patches.map_or(0.0, |p| p.outlier_ratio),
            MetricKind::TailGap => features.tail_gap(),
        }
    }
}

/// Piecewise-linear, monotone non-decreasing map of a metric onto [0,1]
pub fn map_piecewise(x: f64, bp: &Breakpoints) -> f64 {
    let lerp = |x: f64, x0: f64, x1: f64, y0: f64, y1: f64| y0 + (x - x0) / (x1 - x0) * (y1 - y0);

    let score = if !x.is_finite() || x < bp.clean_max {
        0.0
    } else if x < bp.low_max {
        lerp(x, bp.clean_max, bp.low_max, bp.low_floor, bp.moderate_floor)
    } else if x < bp.moderate_max {
        lerp(x, bp.low_max, bp.moderate_max, bp.moderate_floor, bp.high_floor)
    } else {
        let headroom = 1.0 - bp.high_floor;
        bp.high_floor + ((x - bp.moderate_max) / (bp.saturation - bp.moderate_max) * headroom).min(headroom)
    };
    score.clamp(0.0, 1.0)
}

/// Location/energy/area term; zero when no region survived filtering
pub fn region_term(regions: &RegionStats, blend: &RegionBlend) -> f64 {
    if regions.count() == 0 {
        return 0.0;
    }
    let location = (regions.count() as f64 / blend.location_saturation).min(1.0);
    let energy = regions.high_energy.clamp(0.0, 1.0);
    let area = (regions.largest_area_ratio * blend.area_gain).min(1.0);
    (blend.location_weight * location + blend.energy_weight * energy + blend.area_weight * area)
        .clamp(0.0, 1.0)
}

/// Per-region severity in region order (largest first)
pub fn region_severities(
    regions: &RegionStats,
    total_pixels: usize,
    blend: &RegionBlend,
) -> Vec<RegionSeverity> {
    let total = total_pixels.max(1) as f64;
    regions
        .regions
        .iter()
        .map(|r| {
            let area = (r.area as f64 / total * blend.area_gain).min(1.0);
            RegionSeverity {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
                severity: (0.7 * r.mean_intensity + 0.3 * area).clamp(0.0, 1.0),
            }
        })
        .collect()
}
