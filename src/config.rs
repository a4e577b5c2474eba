//! Configuration types and validation for the scoring pipeline
//! Author: kartik4091
//! Created: 2025-07-14
//!
//! Every calibration constant lives here. Components borrow their section at
//! construction time and never consult global state.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::Signal,
};

/// Top-level scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub ela: SignalConfig,
    pub compression: SignalConfig,
    pub noise: SignalConfig,
    pub font: SignalConfig,
    pub regions: RegionConfig,
    pub edge_mask: EdgeMaskConfig,
    pub gate: GateConfig,
    pub fusion: FusionWeights,
    pub metadata: MetadataConfig,
    pub classifier: ClassifierConfig,
    /// Worker threads for page scoring, 0 = one per CPU
    pub worker_threads: usize,
}

/// How a page's tail/outlier metric is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Fraction of patch means above median + k·MAD
    PatchOutlierRatio,
    /// p99 - p95 of the active pixel distribution
    TailGap,
}

/// Per-signal statistics and calibration; a section must be given in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Normalised intensity below which a pixel counts as background
    pub background_floor: f64,
    pub min_active_fraction: f64,
    pub min_active_pixels: usize,
    pub metric: MetricKind,
    /// Patches per axis
    pub patch_grid: u32,
    /// Minimum share of active pixels for a patch to qualify
    pub min_patch_active: f64,
    pub min_patches: usize,
    pub outlier_mad_multiplier: f64,
    pub low_energy_guard: Option<LowEnergyGuard>,
    pub breakpoints: Breakpoints,
    pub use_edge_mask: bool,
    pub region_blend: Option<RegionBlend>,
}

/// Benign-page guard: low patch median together with a small ratio scores zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowEnergyGuard {
    pub max_median: f64,
    pub max_ratio: f64,
}

/// Piecewise-linear metric -> score mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub clean_max: f64,
    pub low_max: f64,
    pub moderate_max: f64,
    pub saturation: f64,
    pub low_floor: f64,
    pub moderate_floor: f64,
    pub high_floor: f64,
}

/// Secondary region terms folded into region-based signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionBlend {
    /// Share of the page score taken by the region term
    pub weight: f64,
    pub location_weight: f64,
    pub energy_weight: f64,
    pub area_weight: f64,
    /// Region count at which the location term saturates
    pub location_saturation: f64,
    /// Multiplier on the largest-region area ratio
    pub area_gain: f64,
}

/// Connected-component filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub mad_multiplier: f64,
    pub min_area: u32,
    pub max_aspect: f64,
    pub min_density: f64,
}

/// Canny + dilation settings for stroke masks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeMaskConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub dilation_radius: u8,
}

/// Clean gates, blend weights and category thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Compression score below which ELA is ignored
    pub ela_gate_off_below: f64,
    /// Compression score from which ELA counts fully
    pub ela_full_from: f64,
    pub ela_partial_weight: f64,
    /// Forensic risk below which the document is clean without the classifier
    pub clean_gate: f64,
    pub forensic_weight: f64,
    pub ml_weight: f64,
    /// Blended 0-100 scores below this are forced clean
    pub post_blend_floor: f64,
    pub moderate_from: f64,
    pub high_from: f64,
    pub very_high_from: f64,
    pub critical_from: f64,
}

/// Fixed weights of the forensic fusion rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub ela: f64,
    pub compression: f64,
    pub noise: f64,
    pub font: f64,
    pub metadata: f64,
}

/// Authoring-tool signature lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub clean_sources: Vec<String>,
    pub programmatic_sources: Vec<String>,
    pub scanner_sources: Vec<String>,
    pub editor_sources: Vec<String>,
    pub clean_score: f64,
    pub scanner_score: f64,
    pub editor_score: f64,
    pub unknown_score: f64,
    pub absent_score: f64,
}

/// Classifier call bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub timeout_ms: u64,
    pub fallback_probability: f64,
}

impl ScoringConfig {
    /// Loads a JSON or YAML file, falling back to defaults for missing fields
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: ScoringConfig = serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| Error::ConfigError(format!("Config parsing error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn signal(&self, signal: Signal) -> &SignalConfig {
        match signal {
            Signal::Ela => &self.ela,
            Signal::Compression => &self.compression,
            Signal::Noise => &self.noise,
            Signal::Font => &self.font,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for signal in Signal::ALL {
            self.signal(signal)
                .validate()
                .map_err(|e| Error::InvalidConfiguration(format!("{}: {}", signal, e)))?;
        }
        self.fusion.validate()?;
        self.gate.validate()?;

        let scores = [
            self.metadata.clean_score,
            self.metadata.scanner_score,
            self.metadata.editor_score,
            self.metadata.unknown_score,
            self.metadata.absent_score,
            self.classifier.fallback_probability,
        ];
        if scores.iter().any(|s| !(0.0..=1.0).contains(s)) {
            return Err(Error::InvalidConfiguration(
                "metadata scores and fallback probability must lie in [0,1]".into(),
            ));
        }
        if self.regions.min_density < 0.0 || self.regions.max_aspect < 1.0 {
            return Err(Error::InvalidConfiguration("region filters out of range".into()));
        }
        Ok(())
    }
}

impl SignalConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..1.0).contains(&self.background_floor) {
            return Err("background floor must lie in [0,1)".into());
        }
        if self.patch_grid == 0 {
            return Err("patch grid must be at least 1".into());
        }
        if self.outlier_mad_multiplier <= 0.0 {
            return Err("outlier MAD multiplier must be positive".into());
        }
        self.breakpoints.validate()?;
        if let Some(blend) = &self.region_blend {
            blend.validate()?;
        }
        Ok(())
    }
}

impl Breakpoints {
    fn validate(&self) -> std::result::Result<(), String> {
        let edges = self.clean_max < self.low_max
            && self.low_max < self.moderate_max
            && self.moderate_max < self.saturation;
        let bands = 0.0 <= self.low_floor
            && self.low_floor <= self.moderate_floor
            && self.moderate_floor <= self.high_floor
            && self.high_floor <= 1.0;
        if !edges || !bands {
            return Err("breakpoints must be strictly increasing with ordered bands in [0,1]".into());
        }
        Ok(())
    }
}

impl RegionBlend {
    fn validate(&self) -> std::result::Result<(), String> {
        let terms = [self.location_weight, self.energy_weight, self.area_weight];
        if !(0.0..=1.0).contains(&self.weight) || terms.iter().any(|w| *w < 0.0) {
            return Err("region blend weights must be non-negative".into());
        }
        if (terms.iter().sum::<f64>() - 1.0).abs() > 1e-6 {
            return Err("region term weights must sum to 1".into());
        }
        if self.location_saturation <= 0.0 || self.area_gain < 0.0 {
            return Err("region saturation must be positive".into());
        }
        Ok(())
    }
}

impl FusionWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [self.ela, self.compression, self.noise, self.font, self.metadata]
    }

    fn validate(&self) -> Result<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| *w < 0.0) {
            return Err(Error::InvalidConfiguration("fusion weights must be non-negative".into()));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || total > 1.0 + 1e-9 {
            return Err(Error::InvalidConfiguration(format!(
                "fusion weights must sum to (0, 1], got {}",
                total
            )));
        }
        Ok(())
    }
}

impl GateConfig {
    fn validate(&self) -> Result<()> {
        if self.ela_gate_off_below > self.ela_full_from {
            return Err(Error::InvalidConfiguration("ELA gate thresholds out of order".into()));
        }
        if (self.forensic_weight + self.ml_weight - 1.0).abs() > 1e-9
            || self.forensic_weight < 0.0
            || self.ml_weight < 0.0
        {
            return Err(Error::InvalidConfiguration("blend weights must sum to 1".into()));
        }
        let ordered = self.post_blend_floor <= self.moderate_from
            && self.moderate_from <= self.high_from
            && self.high_from <= self.very_high_from
            && self.very_high_from <= self.critical_from
            && self.critical_from <= 100.0;
        if !ordered {
            return Err(Error::InvalidConfiguration("category thresholds out of order".into()));
        }
        Ok(())
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Defaults

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ela: SignalConfig::ela(),
            compression: SignalConfig::compression(),
            noise: SignalConfig::noise(),
            font: SignalConfig::font(),
            regions: RegionConfig::default(),
            edge_mask: EdgeMaskConfig::default(),
            gate: GateConfig::default(),
            fusion: FusionWeights::default(),
            metadata: MetadataConfig::default(),
            classifier: ClassifierConfig::default(),
            worker_threads: 0,
        }
    }
}

impl SignalConfig {
    pub fn ela() -> Self {
        Self {
            use_edge_mask: true,
            ..Self::default()
        }
    }

    pub fn compression() -> Self {
        Self {
            breakpoints: Breakpoints {
                clean_max: 0.01,
                low_max: 0.03,
                moderate_max: 0.08,
                saturation: 0.18,
                low_floor: 0.10,
                moderate_floor: 0.40,
                high_floor: 0.80,
            },
            region_blend: Some(RegionBlend {
                weight: 0.35,
                ..RegionBlend::default()
            }),
            ..Self::default()
        }
    }

    pub fn noise() -> Self {
        Self {
            outlier_mad_multiplier: 3.5,
            breakpoints: Breakpoints {
                clean_max: 0.015,
                low_max: 0.04,
                moderate_max: 0.09,
                saturation: 0.20,
                low_floor: 0.10,
                moderate_floor: 0.35,
                high_floor: 0.70,
            },
            region_blend: Some(RegionBlend::default()),
            ..Self::default()
        }
    }

    pub fn font() -> Self {
        Self {
            metric: MetricKind::TailGap,
            min_active_pixels: 2000,
            low_energy_guard: None,
            use_edge_mask: true,
            breakpoints: Breakpoints {
                clean_max: 0.04,
                low_max: 0.08,
                moderate_max: 0.15,
                saturation: 0.30,
                low_floor: 0.10,
                moderate_floor: 0.35,
                high_floor: 0.70,
            },
            ..Self::default()
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            background_floor: 0.02,
            min_active_fraction: 0.015,
            min_active_pixels: 500,
            metric: MetricKind::PatchOutlierRatio,
            patch_grid: 60,
            min_patch_active: 0.12,
            min_patches: 120,
            outlier_mad_multiplier: 3.0,
            low_energy_guard: Some(LowEnergyGuard {
                max_median: 0.03,
                max_ratio: 0.06,
            }),
            breakpoints: Breakpoints {
                clean_max: 0.01,
                low_max: 0.03,
                moderate_max: 0.07,
                saturation: 0.15,
                low_floor: 0.12,
                moderate_floor: 0.40,
                high_floor: 0.75,
            },
            use_edge_mask: false,
            region_blend: None,
        }
    }
}

impl Default for RegionBlend {
    fn default() -> Self {
        Self {
            weight: 0.5,
            location_weight: 0.55,
            energy_weight: 0.30,
            area_weight: 0.15,
            location_saturation: 4.0,
            area_gain: 10.0,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            mad_multiplier: 4.0,
            min_area: 150,
            max_aspect: 8.0,
            min_density: 0.25,
        }
    }
}

impl Default for EdgeMaskConfig {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            dilation_radius: 2,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ela_gate_off_below: 0.03,
            ela_full_from: 0.07,
            ela_partial_weight: 0.5,
            clean_gate: 0.06,
            forensic_weight: 0.7,
            ml_weight: 0.3,
            post_blend_floor: 10.0,
            moderate_from: 35.0,
            high_from: 55.0,
            very_high_from: 75.0,
            critical_from: 90.0,
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            ela: 0.25,
            compression: 0.25,
            noise: 0.20,
            font: 0.15,
            metadata: 0.15,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            clean_sources: list(&[
                "microsoft", "word", "excel", "chrome", "mac os", "libreoffice", "google", "docs",
                "drive",
            ]),
            programmatic_sources: list(&[
                "reportlab", "fpdf", "pyfpdf", "pymupdf", "fitz", "wkhtmltopdf", "weasyprint",
                "pandoc", "latex", "tex",
            ]),
            scanner_sources: list(&[
                "scanner", "print", "cups", "xerox", "canon", "epson", "hp", "brother",
            ]),
            editor_sources: list(&["photoshop", "canva", "gimp", "illustrator", "indesign"]),
            clean_score: 0.1,
            scanner_score: 0.25,
            editor_score: 0.8,
            unknown_score: 0.35,
            absent_score: 0.2,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            fallback_probability: 0.5,
        }
    }
}
