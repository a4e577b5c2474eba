//! Robust statistics extraction from a single diagnostic image
//! Author: kartik4091
//! Created: 2025-07-15 14:40:27 UTC
//!
//! A diagnostic image (ELA residual, compression diff, noise map or font
//! overlay) is reduced to order statistics over its non-background pixels,
//! optionally restricted to an edge mask, plus patch-grid means and
//! connected-component geometry of the high-residual pixels.

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::{
    edge_mask::EdgeMask,
    regions::{analyze_regions, RegionStats},
    robust,
};
use crate::{
    config::{MetricKind, RegionConfig, SignalConfig},
    error::{Error, Result},
    types::LowContentReason,
};

const MAD_EPSILON: f64 = 1e-6;
const MIN_PATCH_SIDE: u32 = 10;

/// Grayscale diagnostic image normalised to [0,1]
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticImage {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl DiagnosticImage {
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let pixels = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Self { width, height, pixels }
    }

    /// Row-major normalised intensities; `None` when the length does not match
    pub fn from_normalized(width: u32, height: u32, pixels: Vec<f32>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then(|| Self {
            width,
            height,
            pixels: pixels.into_iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| Error::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_dynamic(&image))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

/// Patch-grid summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchStats {
    pub count: usize,
    pub median: f64,
    pub mad: f64,
    /// Fraction of patch means above median + k·MAD
    pub outlier_ratio: f64,
}

/// Per-page, per-signal robust features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub total_pixels: usize,
    pub active_pixels: usize,
    pub active_fraction: f64,
    pub median: f64,
    pub mad: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub patches: Option<PatchStats>,
    pub regions: Option<RegionStats>,
}

impl FeatureVector {
    pub fn tail_gap(&self) -> f64 {
        (self.p99 - self.p95).max(0.0)
    }
}

/// Extraction result: features, or a low-content marker
#[derive(Debug, Clone, PartialEq)]
pub enum PageStats {
    Features(FeatureVector),
    LowContent(LowContentReason),
}

/// Feature extractor configured for one signal
#[derive(Debug, Clone)]
pub struct DiagnosticImageStats {
    signal: SignalConfig,
    regions: RegionConfig,
}

impl DiagnosticImageStats {
    pub fn new(signal: SignalConfig, regions: RegionConfig) -> Self {
        Self { signal, regions }
    }

    /// Deterministic given identical pixels; the image is only read
    pub fn extract(&self, image: &DiagnosticImage, mask: Option<&EdgeMask>) -> PageStats {
        let total = image.pixels.len();
        if total == 0 {
            return PageStats::LowContent(LowContentReason::TooFewPixels { count: 0 });
        }
        // a mask of another size would index the wrong pixels
        let mask = mask.filter(|m| m.dimensions() == image.dimensions());
        let floor = self.signal.background_floor as f32;
        let qualifies = |i: usize, v: f32| v > floor && mask.map_or(true, |m| m.contains(i));

        let active: Vec<f32> = image
            .pixels
            .iter()
            .enumerate()
            .filter(|(i, v)| qualifies(*i, **v))
            .map(|(_, v)| *v)
            .collect();

        let active_fraction = active.len() as f64 / total as f64;
        if active_fraction < self.signal.min_active_fraction {
            return PageStats::LowContent(LowContentReason::SparseActivity { active_fraction });
        }
        if active.len() < self.signal.min_active_pixels {
            return PageStats::LowContent(LowContentReason::TooFewPixels { count: active.len() });
        }

        let sorted = robust::sorted(&active);
        let median = robust::percentile_sorted(&sorted, 50.0);
        let mad = robust::mad(&active, median);
        let p90 = robust::percentile_sorted(&sorted, 90.0);
        let p95 = robust::percentile_sorted(&sorted, 95.0);
        let p99 = robust::percentile_sorted(&sorted, 99.0);
        drop(sorted);

        let patches = match self.signal.metric {
            MetricKind::PatchOutlierRatio => {
                let values = self.patch_values(image, &qualifies);
                if values.len() < self.signal.min_patches {
                    return PageStats::LowContent(LowContentReason::TooFewPatches {
                        count: values.len(),
                    });
                }
                Some(self.patch_stats(&values))
            }
            MetricKind::TailGap => None,
        };

        let regions = self.signal.region_blend.map(|_| {
            let threshold = median + self.regions.mad_multiplier * mad;
            let high: Vec<bool> = image
                .pixels
                .iter()
                .enumerate()
                .map(|(i, v)| qualifies(i, *v) && *v as f64 > threshold)
                .collect();
            analyze_regions(&image.pixels, &high, image.width, image.height, &self.regions)
        });

        PageStats::Features(FeatureVector {
            total_pixels: total,
            active_pixels: active.len(),
            active_fraction,
            median,
            mad,
            p90,
            p95,
            p99,
            patches,
            regions,
        })
    }

    /// Mean active intensity of every patch with enough active pixels
    fn patch_values(&self, image: &DiagnosticImage, qualifies: &impl Fn(usize, f32) -> bool) -> Vec<f32> {
        let grid = self.signal.patch_grid.max(1);
        let ph = (image.height / grid).max(MIN_PATCH_SIDE) as usize;
        let pw = (image.width / grid).max(MIN_PATCH_SIDE) as usize;
        let (w, h) = (image.width as usize, image.height as usize);

        let mut values = Vec::new();
        for y0 in (0..h).step_by(ph) {
            for x0 in (0..w).step_by(pw) {
                let y1 = (y0 + ph).min(h);
                let x1 = (x0 + pw).min(w);
                let size = (y1 - y0) * (x1 - x0);

                let mut count = 0usize;
                let mut sum = 0.0f64;
                for y in y0..y1 {
                    let row = y * w;
                    for x in x0..x1 {
                        let v = image.pixels[row + x];
                        if qualifies(row + x, v) {
                            count += 1;
                            sum += v as f64;
                        }
                    }
                }

                if count == 0 || (count as f64 / size as f64) < self.signal.min_patch_active {
                    continue;
                }
                values.push((sum / count as f64) as f32);
            }
        }
        values
    }

    fn patch_stats(&self, values: &[f32]) -> PatchStats {
        let median = robust::median(values);
        let mad = robust::mad(values, median) + MAD_EPSILON;
        let threshold = median + self.signal.outlier_mad_multiplier * mad;
        PatchStats {
            count: values.len(),
            median,
            mad,
            outlier_ratio: robust::fraction_above(values, threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;

    fn uniform(width: u32, height: u32, value: f32) -> DiagnosticImage {
        DiagnosticImage::from_normalized(width, height, vec![value; (width * height) as usize]).unwrap()
    }

    fn extractor(signal: SignalConfig) -> DiagnosticImageStats {
        DiagnosticImageStats::new(signal, RegionConfig::default())
    }

    #[test]
    fn test_blank_page_is_low_content() {
        let stats = extractor(SignalConfig::ela()).extract(&uniform(300, 300, 0.0), None);
        assert!(matches!(
            stats,
            PageStats::LowContent(LowContentReason::SparseActivity { .. })
        ));
    }

    #[test]
    fn test_tiny_page_has_too_few_pixels() {
        let stats = extractor(SignalConfig::font()).extract(&uniform(20, 20, 0.5), None);
        assert_eq!(
            stats,
            PageStats::LowContent(LowContentReason::TooFewPixels { count: 400 })
        );
    }

    #[test]
    fn test_uniform_page_statistics() {
        let PageStats::Features(features) =
            extractor(SignalConfig::ela()).extract(&uniform(600, 600, 0.2), None)
        else {
            panic!("expected features");
        };
        assert_eq!(features.active_pixels, 360_000);
        assert!((features.median - 0.2).abs() < 1e-6);
        assert!(features.mad < 1e-6);
        let patches = features.patches.unwrap();
        assert_eq!(patches.count, 3600);
        assert_eq!(patches.outlier_ratio, 0.0);
        assert!(features.regions.is_none());
    }

    #[test]
    fn test_bright_block_raises_outlier_ratio() {
        let mut pixels = vec![0.2f32; 600 * 600];
        for y in 100..220 {
            for x in 100..220 {
                pixels[y * 600 + x] = 0.9;
            }
        }
        let image = DiagnosticImage::from_normalized(600, 600, pixels).unwrap();
        let PageStats::Features(features) = extractor(SignalConfig::compression()).extract(&image, None)
        else {
            panic!("expected features");
        };
        // 12x12 of 60x60 patches
        let ratio = features.patches.unwrap().outlier_ratio;
        assert!((ratio - 144.0 / 3600.0).abs() < 1e-9);
        let regions = features.regions.unwrap();
        assert_eq!(regions.count(), 1);
        assert_eq!(regions.regions[0].area, 14_400);
    }

    #[test]
    fn test_edge_mask_restricts_pixels() {
        let image = uniform(100, 100, 0.5);
        let bits = (0..10_000).map(|i| i < 3_000).collect();
        let mask = EdgeMask::from_bits(100, 100, bits).unwrap();
        let signal = SignalConfig {
            metric: MetricKind::TailGap,
            ..SignalConfig::font()
        };
        let PageStats::Features(features) = extractor(signal).extract(&image, Some(&mask)) else {
            panic!("expected features");
        };
        assert_eq!(features.active_pixels, 3_000);
        assert!((features.active_fraction - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_mask_is_ignored() {
        let image = uniform(100, 100, 0.5);
        let mask = EdgeMask::from_bits(10, 10, vec![false; 100]).unwrap();
        let PageStats::Features(features) =
            extractor(SignalConfig::font()).extract(&image, Some(&mask))
        else {
            panic!("expected features");
        };
        assert_eq!(features.active_pixels, 10_000);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let pixels: Vec<f32> = (0..400 * 400).map(|i| ((i * 37) % 251) as f32 / 255.0).collect();
        let image = DiagnosticImage::from_normalized(400, 400, pixels).unwrap();
        let stats = extractor(SignalConfig::noise());
        assert_eq!(stats.extract(&image, None), stats.extract(&image, None));
    }
}
