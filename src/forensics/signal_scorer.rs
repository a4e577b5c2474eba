//! Scores every page of every signal directory
//! Author: kartik4091
//! Created: 2025-07-19 08:31:57 UTC

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::layout::{list_pages, ForensicsLayout};
use crate::{
    analyzer::{DiagnosticImage, DiagnosticImageStats, EdgeMask},
    config::ScoringConfig,
    error::Error,
    scoring::{DocumentAggregator, PageScorer, SignalSummary},
    types::{PageOutcome, PageRef, Signal},
    utils::Metrics,
};

/// One page and what the scorer made of it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPage {
    pub page: PageRef,
    pub outcome: PageOutcome,
}

/// Page outcomes of one signal and their document-level reduction
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRun {
    pub summary: SignalSummary,
    pub pages: Vec<ScoredPage>,
}

/// Stats extraction and page scoring for the four image signals
#[derive(Debug, Clone)]
pub struct SignalScorer {
    config: ScoringConfig,
    aggregator: DocumentAggregator,
    metrics: Metrics,
}

impl SignalScorer {
    pub fn new(config: ScoringConfig, metrics: Metrics) -> Self {
        Self {
            config,
            aggregator: DocumentAggregator::new(),
            metrics,
        }
    }

    /// Runs all signals in parallel; blocking, call off the async runtime
    pub fn score_all(&self, layout: &ForensicsLayout) -> Vec<SignalRun> {
        Signal::ALL
            .par_iter()
            .map(|&signal| self.score_signal(layout, signal))
            .collect()
    }

    #[instrument(skip(self, layout), fields(folder = layout.folder_name()))]
    pub fn score_signal(&self, layout: &ForensicsLayout, signal: Signal) -> SignalRun {
        let dir = layout.signal_dir(signal);
        if !dir.is_dir() {
            warn!("⚠️ {}, {} scores 0", Error::MissingSignalDirectory(dir), signal);
            return SignalRun {
                summary: SignalSummary::missing(signal),
                pages: Vec::new(),
            };
        }

        let pages = match list_pages(&dir) {
            Ok(pages) => pages,
            Err(err) => {
                warn!("⚠️ cannot list {}: {}", dir.display(), err);
                Vec::new()
            }
        };

        let signal_config = self.config.signal(signal).clone();
        let extractor = DiagnosticImageStats::new(signal_config.clone(), self.config.regions);
        let scorer = PageScorer::new(signal, signal_config.clone());
        let preprocessed = signal_config
            .use_edge_mask
            .then(|| layout.preprocessed_dir());

        let scored: Vec<ScoredPage> = pages
            .into_par_iter()
            .map(|page| {
                let outcome = self.score_page(&extractor, &scorer, &page, preprocessed.as_deref());
                self.metrics.record_page(signal, &outcome);
                ScoredPage { page, outcome }
            })
            .collect();

        let outcomes: Vec<PageOutcome> = scored.iter().map(|p| p.outcome.clone()).collect();
        let summary = self.aggregator.aggregate(signal, &outcomes);
        info!(
            "📊 {} score {:.3} ({} scored, {} low-content, {} skipped)",
            signal,
            summary.score,
            summary.pages_scored,
            summary.pages_low_content,
            summary.pages_skipped
        );

        SignalRun {
            summary,
            pages: scored,
        }
    }

    fn score_page(
        &self,
        extractor: &DiagnosticImageStats,
        scorer: &PageScorer,
        page: &PageRef,
        preprocessed: Option<&Path>,
    ) -> PageOutcome {
        let image = match DiagnosticImage::open(&page.path) {
            Ok(image) => image,
            Err(err) => {
                warn!("⚠️ skipping page {}: {}", page.path.display(), err);
                return PageOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
        };

        let mask = preprocessed.and_then(|dir| self.load_mask(dir, page, &image));
        let stats = extractor.extract(&image, mask.as_ref());
        let outcome = scorer.score(&stats);
        match &outcome {
            PageOutcome::LowContent(reason) => {
                debug!(page = %page.file_name, "low content: {}", reason)
            }
            _ => debug!(page = %page.file_name, ?outcome, "page scored"),
        }
        outcome
    }

    fn load_mask(&self, dir: &Path, page: &PageRef, image: &DiagnosticImage) -> Option<EdgeMask> {
        let path = dir.join(&page.file_name);
        if !path.is_file() {
            return None;
        }
        let (width, height) = image.dimensions();
        match EdgeMask::load(&path, &self.config.edge_mask, width, height) {
            Ok(mask) => Some(mask),
            Err(err) => {
                debug!("edge mask unusable, using all pixels: {}", err);
                None
            }
        }
    }
}
