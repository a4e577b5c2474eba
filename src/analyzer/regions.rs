//! Connected-component analysis of high-residual pixels

use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};

use crate::config::RegionConfig;

/// One surviving high-residual region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub area: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Area over bounding-box area
    pub density: f64,
    pub mean_intensity: f64,
}

impl Region {
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width.max(self.height) as f64;
        let short = self.width.min(self.height).max(1) as f64;
        long / short
    }
}

/// Region geometry summary for one page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionStats {
    pub regions: Vec<Region>,
    /// Largest surviving region area over page area
    pub largest_area_ratio: f64,
    /// Mean intensity of every pixel in the high mask
    pub high_energy: f64,
    pub high_pixels: usize,
}

impl RegionStats {
    pub fn count(&self) -> usize {
        self.regions.len()
    }
}

#[derive(Default)]
struct Accumulator {
    area: u32,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    sum: f64,
}

/// Labels 8-connected pixels of `high` and keeps compact, non-elongated regions.
/// `pixels` and `high` are row-major `width x height`.
pub fn analyze_regions(
    pixels: &[f32],
    high: &[bool],
    width: u32,
    height: u32,
    config: &RegionConfig,
) -> RegionStats {
    let total = width as usize * height as usize;
    if total == 0 || pixels.len() != total || high.len() != total {
        return RegionStats::default();
    }

    let mut binary = GrayImage::new(width, height);
    let mut high_pixels = 0usize;
    let mut high_sum = 0.0f64;
    for (i, on) in high.iter().enumerate() {
        if *on {
            let (x, y) = ((i % width as usize) as u32, (i / width as usize) as u32);
            binary.put_pixel(x, y, Luma([255u8]));
            high_pixels += 1;
            high_sum += pixels[i] as f64;
        }
    }
    if high_pixels == 0 {
        return RegionStats::default();
    }

    let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));
    let mut accumulators: HashMap<u32, Accumulator> = HashMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let id = label.0[0];
        if id == 0 {
            continue;
        }
        let acc = accumulators.entry(id).or_insert_with(|| Accumulator {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            ..Accumulator::default()
        });
        acc.area += 1;
        acc.min_x = acc.min_x.min(x);
        acc.min_y = acc.min_y.min(y);
        acc.max_x = acc.max_x.max(x);
        acc.max_y = acc.max_y.max(y);
        acc.sum += pixels[y as usize * width as usize + x as usize] as f64;
    }

    let mut regions: Vec<Region> = accumulators
        .into_values()
        .map(|acc| {
            let w = acc.max_x - acc.min_x + 1;
            let h = acc.max_y - acc.min_y + 1;
            Region {
                area: acc.area,
                x: acc.min_x,
                y: acc.min_y,
                width: w,
                height: h,
                density: acc.area as f64 / (w as f64 * h as f64),
                mean_intensity: acc.sum / acc.area as f64,
            }
        })
        .filter(|r| {
            r.area >= config.min_area
                && r.aspect_ratio() <= config.max_aspect
                && r.density >= config.min_density
        })
        .collect();
    regions.sort_by(|a, b| b.area.cmp(&a.area).then(a.y.cmp(&b.y)).then(a.x.cmp(&b.x)));

    let largest_area_ratio = regions
        .first()
        .map_or(0.0, |r| r.area as f64 / total as f64);

    RegionStats {
        regions,
        largest_area_ratio,
        high_energy: high_sum / high_pixels as f64,
        high_pixels,
    }
}
