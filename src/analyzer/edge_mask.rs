//! Stroke/text masks derived from preprocessed pages
//! Author: kartik4091
//! Created: 2025-07-16 10:02:11 UTC

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GrayImage};
use imageproc::{distance_transform::Norm, edges::canny, morphology::dilate};
use tracing::debug;

use crate::{
    config::EdgeMaskConfig,
    error::{Error, Result},
};

/// Binary mask restricting statistics to stroke regions
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl EdgeMask {
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        (bits.len() == width as usize * height as usize).then_some(Self { width, height, bits })
    }

    /// Canny edges of the preprocessed page, dilated, resized to `width x height`
    pub fn from_preprocessed(
        page: &DynamicImage,
        config: &EdgeMaskConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let gray = page.to_luma8();
        let edges = canny(&gray, config.low_threshold, config.high_threshold);
        let mut mask: GrayImage = if config.dilation_radius > 0 {
            dilate(&edges, Norm::LInf, config.dilation_radius)
        } else {
            edges
        };

        if mask.dimensions() != (width, height) {
            debug!(
                "resizing edge mask {:?} -> {}x{}",
                mask.dimensions(),
                width,
                height
            );
            mask = image::imageops::resize(&mask, width, height, FilterType::Nearest);
        }

        let bits = mask.pixels().map(|p| p.0[0] > 0).collect();
        Self { width, height, bits }
    }

    pub fn load(path: &Path, config: &EdgeMaskConfig, width: u32, height: u32) -> Result<Self> {
        let page = image::open(path).map_err(|e| Error::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_preprocessed(&page, config, width, height))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Share of pixels inside the mask
    pub fn coverage(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        self.bits.iter().filter(|b| **b).count() as f64 / self.bits.len() as f64
    }
}
