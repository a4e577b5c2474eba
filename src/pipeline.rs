//! Statement Tamper-Risk Pipeline - Stage-by-Stage Execution
//! Author: kartik4091
//! Created: 2025-06-05
//! Goal: Turn a document's diagnostic image folders and PDF metadata into a
//! single persisted risk report.

use std::{path::PathBuf, sync::Arc};

use tracing::{info, instrument, warn};

use crate::{
    classifier::Classifier,
    config::ScoringConfig,
    error::{Error, Result},
    forensics::{ForensicsLayout, SignalRun, SignalScorer},
    metadata::{MetadataAssessment, MetadataScorer},
    report::{FinalReport, ReportAssembler, ReportWriter},
    scoring::{BlendOutcome, ElaGate, ForensicRiskFusion, RiskGate},
    types::{DocumentId, Signal, SignalScores},
    utils::{Metrics, MetricsSnapshot},
};

/// One document to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub record_id: u64,
    pub document_id: DocumentId,
    /// Source PDF for metadata scoring; absent metadata when `None`
    pub pdf_path: Option<PathBuf>,
}

impl AnalysisRequest {
    pub fn new(record_id: u64, document_id: DocumentId) -> Self {
        Self {
            record_id,
            document_id,
            pdf_path: None,
        }
    }

    /// Document id taken from the PDF file stem
    pub fn for_pdf(record_id: u64, pdf_path: PathBuf) -> Result<Self> {
        let document_id = DocumentId::from_pdf_path(&pdf_path).ok_or_else(|| {
            Error::InvalidConfiguration(format!("no file stem in {}", pdf_path.display()))
        })?;
        Ok(Self {
            record_id,
            document_id,
            pdf_path: Some(pdf_path),
        })
    }

    pub fn with_pdf(mut self, pdf_path: PathBuf) -> Self {
        self.pdf_path = Some(pdf_path);
        self
    }
}

/// Everything a run produced; only `report` is persisted
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub report: FinalReport,
    pub report_path: Option<PathBuf>,
    pub signals: Vec<SignalRun>,
    pub metadata: MetadataAssessment,
    pub scores: SignalScores,
    pub forensic_risk: f64,
    pub gate: BlendOutcome,
}

/// Orchestrates folder resolution, page scoring, fusion, gating and reporting
pub struct Pipeline {
    config: ScoringConfig,
    forensics_root: PathBuf,
    classifier: Arc<dyn Classifier>,
    writer: Option<ReportWriter>,
    metrics: Metrics,
}

impl Pipeline {
    pub fn new(
        config: ScoringConfig,
        forensics_root: impl Into<PathBuf>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            config,
            forensics_root: forensics_root.into(),
            classifier,
            writer: None,
            metrics: Metrics::new(),
        }
    }

    /// Persist reports under `dir`; without it reports are only returned
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.writer = Some(ReportWriter::new(dir));
        self
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.get_all_metrics()
    }

    /// Executes the 7-stage scoring pipeline
    #[instrument(skip(self, request), fields(record_id = request.record_id, document = %request.document_id))]
    pub async fn execute(&self, request: &AnalysisRequest) -> Result<ScoringOutcome> {
        info!("🚦 Starting tamper-risk scoring");

        // Stage 1: Forensics folder resolution
        let layout = self.stage_1_resolve_folder(&request.document_id)?;

        // Stage 2: Page scoring for every image signal
        let signals = self.stage_2_signal_scoring(&layout).await?;

        // Stage 3: Compression-gated ELA
        let mut scores = self.stage_3_ela_gate(&signals);

        // Stage 4: Metadata scoring
        let metadata = self.stage_4_metadata(request).await?;
        scores.metadata = metadata.score;

        // Stage 5: Forensic risk fusion
        let forensic_risk = self.stage_5_fusion(&scores);

        // Stage 6: Clean gate, classifier and blend
        let gate = self.stage_6_gate(&scores, forensic_risk).await;

        // Stage 7: Report
        let (report, report_path) = self
            .stage_7_report(request.record_id, &layout, &scores, forensic_risk, &gate)
            .await?;

        info!(
            "✅ Scoring completed: {} ({:.2})",
            gate.risk_category, gate.final_score
        );
        Ok(ScoringOutcome {
            report,
            report_path,
            signals,
            metadata,
            scores,
            forensic_risk,
            gate,
        })
    }

    /// Stage 1: Forensics folder resolution
    #[instrument(skip(self))]
    fn stage_1_resolve_folder(&self, document_id: &DocumentId) -> Result<ForensicsLayout> {
        info!("📂 Stage 1: Forensics folder resolution");
        ForensicsLayout::resolve(&self.forensics_root, document_id)
    }

    /// Stage 2: Page scoring, all pages joined before reduction
    #[instrument(skip(self, layout))]
    async fn stage_2_signal_scoring(&self, layout: &ForensicsLayout) -> Result<Vec<SignalRun>> {
        info!("🧮 Stage 2: Page scoring");
        self.metrics.start_timer("stage.signal_scoring");

        let threads = match self.config.worker_threads {
            0 => num_cpus::get(),
            n => n,
        };
        let scorer = SignalScorer::new(self.config.clone(), self.metrics.clone());
        let layout = layout.clone();

        let runs = tokio::task::spawn_blocking(move || -> Result<Vec<SignalRun>> {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::InternalError(format!("worker pool: {}", e)))?;
            Ok(pool.install(|| scorer.score_all(&layout)))
        })
        .await??;

        self.metrics.end_timer("stage.signal_scoring");
        Ok(runs)
    }

    /// Stage 3: ELA weighted by compression evidence
    fn stage_3_ela_gate(&self, signals: &[SignalRun]) -> SignalScores {
        info!("🚧 Stage 3: ELA compression gate");
        let score_of = |signal: Signal| {
            signals
                .iter()
                .find(|run| run.summary.signal == signal)
                .map_or(0.0, |run| run.summary.score)
        };

        let compression = score_of(Signal::Compression);
        let raw_ela = score_of(Signal::Ela);
        let ela = ElaGate::new(&self.config.gate).apply(raw_ela, compression);
        if ela != raw_ela {
            info!("ELA {:.3} gated to {:.3} (compression {:.3})", raw_ela, ela, compression);
        }

        SignalScores {
            ela,
            compression,
            noise: score_of(Signal::Noise),
            font: score_of(Signal::Font),
            metadata: 0.0,
        }
    }

    /// Stage 4: Metadata scoring
    #[instrument(skip(self, request))]
    async fn stage_4_metadata(&self, request: &AnalysisRequest) -> Result<MetadataAssessment> {
        info!("🏭 Stage 4: Metadata scoring");
        let scorer = MetadataScorer::new(self.config.metadata.clone());
        match request.pdf_path.clone() {
            Some(path) => Ok(tokio::task::spawn_blocking(move || scorer.score_pdf(&path)).await?),
            None => {
                warn!("⚠️ no PDF supplied, metadata treated as absent");
                Ok(scorer.assess(None))
            }
        }
    }

    /// Stage 5: Forensic risk fusion
    fn stage_5_fusion(&self, scores: &SignalScores) -> f64 {
        info!("🧪 Stage 5: Forensic risk fusion");
        let risk = ForensicRiskFusion::new(self.config.fusion).fuse(scores);
        self.metrics.set_gauge("forensic_risk", risk);
        risk
    }

    /// Stage 6: Clean gate, classifier and blend
    async fn stage_6_gate(&self, scores: &SignalScores, forensic_risk: f64) -> BlendOutcome {
        info!("🧠 Stage 6: Risk gate and blend");
        let gate = RiskGate::new(self.config.gate, self.config.classifier);
        let outcome = gate
            .evaluate(scores, forensic_risk, self.classifier.as_ref())
            .await;
        if outcome.classifier_invoked {
            self.metrics.increment_counter("classifier.invoked");
        }
        self.metrics.set_gauge("final_score", outcome.final_score);
        outcome
    }

    /// Stage 7: Report assembly and persistence
    async fn stage_7_report(
        &self,
        record_id: u64,
        layout: &ForensicsLayout,
        scores: &SignalScores,
        forensic_risk: f64,
        gate: &BlendOutcome,
    ) -> Result<(FinalReport, Option<PathBuf>)> {
        info!("📝 Stage 7: Report");
        let report = ReportAssembler::new().assemble(
            record_id,
            layout.folder_name(),
            scores,
            forensic_risk,
            gate,
        );
        let path = match &self.writer {
            Some(writer) => Some(writer.write(&report).await?),
            None => None,
        };
        Ok((report, path))
    }
}
