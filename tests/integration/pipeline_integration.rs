use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use docforensics::{
    classifier::Prediction,
    types::{ClassifierFeatures, DocumentId},
    AnalysisRequest, Classifier, Error, FinalReport, FixedClassifier, Pipeline, RiskCategory,
    ScoringConfig, ScoringOutcome, Signal,
};

use crate::fixtures::{clean_page, edited_page, text_bars_page, TestFixtures};

#[derive(Default)]
struct CountingClassifier {
    calls: AtomicUsize,
}

#[async_trait]
impl Classifier for CountingClassifier {
    async fn predict(&self, _features: &ClassifierFeatures) -> docforensics::Result<Prediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Prediction { probability: Some(0.8) })
    }
}

struct BrokenClassifier;

#[async_trait]
impl Classifier for BrokenClassifier {
    async fn predict(&self, _features: &ClassifierFeatures) -> docforensics::Result<Prediction> {
        Err(Error::ClassifierUnavailable("model not deployed".into()))
    }
}

fn pipeline(fixtures: &TestFixtures, classifier: Arc<dyn Classifier>) -> Pipeline {
    Pipeline::new(ScoringConfig::default(), fixtures.root_path(), classifier)
        .with_report_dir(fixtures.reports_dir())
}

fn signal_score(outcome: &ScoringOutcome, signal: Signal) -> f64 {
    outcome
        .signals
        .iter()
        .find(|run| run.summary.signal == signal)
        .map(|run| run.summary.score)
        .unwrap()
}

async fn score_edited_page(
    document: &str,
    preprocessed: impl FnOnce(&TestFixtures),
) -> ScoringOutcome {
    let fixtures = TestFixtures::new(document);
    fixtures.write_all_signals(&[edited_page(60, 220)]);
    preprocessed(&fixtures);
    pipeline(&fixtures, Arc::new(FixedClassifier::new(Some(0.5))))
        .execute(&AnalysisRequest::new(12, DocumentId::new(document)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_clean_statement_never_reaches_classifier() {
    let fixtures = TestFixtures::new("stmt_clean");
    fixtures.write_all_signals(&[clean_page(), clean_page(), clean_page()]);
    let pdf = fixtures.write_pdf(Some("Microsoft Word"), None);

    let classifier = Arc::new(CountingClassifier::default());
    let request = AnalysisRequest::for_pdf(101, pdf).unwrap();
    let outcome = pipeline(&fixtures, classifier.clone())
        .execute(&request)
        .await
        .unwrap();

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.report.final_result.risk_category, RiskCategory::CleanDocument);
    assert_eq!(outcome.report.final_result.final_score, 0.0);
    assert_eq!(outcome.report.components.ml.ml_probability, 0.0);
    assert_eq!(outcome.report.components.forensics.metadata_score, 0.1);
    assert_eq!(outcome.report.forensics_folder, "stmt_clean");
    assert!(outcome.report.components.forensics.forensic_risk < 0.06);
}

#[tokio::test]
async fn test_edited_statement_is_flagged_and_persisted() {
    let fixtures = TestFixtures::new("stmt_edited");
    fixtures.write_all_signals(&[clean_page(), edited_page(60, 220), clean_page()]);
    let pdf = fixtures.write_pdf(Some("Adobe Photoshop 25.0"), None);

    let classifier = Arc::new(CountingClassifier::default());
    let request = AnalysisRequest::for_pdf(202, pdf).unwrap();
    let outcome = pipeline(&fixtures, classifier.clone())
        .execute(&request)
        .await
        .unwrap();

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    let forensics = outcome.report.components.forensics;
    assert!(forensics.compression_score > 0.3, "{:?}", forensics);
    assert!(forensics.ela_score > 0.3, "{:?}", forensics);
    assert_eq!(forensics.metadata_score, 0.8);
    assert!(forensics.forensic_risk > 0.4, "{:?}", forensics);
    assert!(outcome.report.final_result.final_score >= 35.0);
    assert_eq!(outcome.report.components.ml.ml_probability, 0.8);

    let path = outcome.report_path.expect("report written");
    assert_eq!(path, fixtures.reports_dir().join("202_final_report.json"));
    let persisted = FinalReport::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted, outcome.report);
}

#[tokio::test]
async fn test_single_edited_page_is_not_diluted() {
    let fixtures = TestFixtures::new("stmt_long");
    let mut pages: Vec<_> = (0..9).map(|_| clean_page()).collect();
    pages.push(edited_page(60, 220));
    fixtures.write_all_signals(&pages);

    let outcome = pipeline(&fixtures, Arc::new(FixedClassifier::new(Some(0.5))))
        .execute(&AnalysisRequest::new(3, DocumentId::new("stmt_long")))
        .await
        .unwrap();

    let compression = outcome
        .signals
        .iter()
        .find(|run| run.summary.signal == Signal::Compression)
        .unwrap();
    assert_eq!(compression.pages.len(), 10);
    let edited_score = compression.pages[9].outcome.contribution().unwrap();
    assert_eq!(compression.summary.score, (edited_score * 1000.0).round() / 1000.0);
}

#[tokio::test]
async fn test_missing_compression_directory_suppresses_ela() {
    let fixtures = TestFixtures::new("stmt_partial");
    for signal in [Signal::Ela, Signal::Noise, Signal::Font] {
        fixtures.write_page(signal, 1, &edited_page(60, 220));
    }

    let outcome = pipeline(&fixtures, Arc::new(FixedClassifier::new(Some(0.5))))
        .execute(&AnalysisRequest::new(4, DocumentId::new("stmt_partial")))
        .await
        .unwrap();

    let compression = outcome
        .signals
        .iter()
        .find(|run| run.summary.signal == Signal::Compression)
        .unwrap();
    assert!(!compression.summary.directory_present);
    assert_eq!(outcome.scores.compression, 0.0);
    assert_eq!(outcome.scores.ela, 0.0);
    assert!(outcome.scores.noise > 0.0);
    assert!(outcome.scores.font > 0.0);
}

#[tokio::test]
async fn test_corrupt_page_is_skipped() {
    let fixtures = TestFixtures::new("stmt_corrupt");
    fixtures.write_all_signals(&[clean_page()]);
    fixtures.write_corrupt_page(Signal::Noise, 2);

    let outcome = pipeline(&fixtures, Arc::new(FixedClassifier::new(None)))
        .execute(&AnalysisRequest::new(5, DocumentId::new("stmt_corrupt")))
        .await
        .unwrap();

    let noise = outcome
        .signals
        .iter()
        .find(|run| run.summary.signal == Signal::Noise)
        .unwrap();
    assert_eq!(noise.summary.pages_skipped, 1);
    assert_eq!(noise.summary.score, 0.0);
    assert_eq!(outcome.report.final_result.risk_category, RiskCategory::CleanDocument);
}

#[tokio::test]
async fn test_falls_back_to_latest_folder() {
    let fixtures = TestFixtures::new("upload_7731");
    fixtures.write_all_signals(&[clean_page()]);

    let outcome = pipeline(&fixtures, Arc::new(FixedClassifier::new(None)))
        .execute(&AnalysisRequest::new(6, DocumentId::new("renamed_statement")))
        .await
        .unwrap();
    assert_eq!(outcome.report.forensics_folder, "upload_7731");
}

#[tokio::test]
async fn test_no_forensics_output_is_fatal() {
    let fixtures = TestFixtures::new("placeholder");
    fs::remove_dir(fixtures.folder()).unwrap();

    let err = pipeline(&fixtures, Arc::new(FixedClassifier::new(None)))
        .execute(&AnalysisRequest::new(7, DocumentId::new("anything")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ForensicsFolderNotFound(_)));
    assert!(!fixtures.reports_dir().join("7_final_report.json").exists());
}

#[tokio::test]
async fn test_unavailable_classifier_uses_default_probability() {
    let fixtures = TestFixtures::new("stmt_soft");
    fixtures.write_all_signals(&[edited_page(60, 220)]);

    let outcome = pipeline(&fixtures, Arc::new(BrokenClassifier))
        .execute(&AnalysisRequest::new(8, DocumentId::new("stmt_soft")))
        .await
        .unwrap();
    assert!(outcome.gate.classifier_invoked);
    assert_eq!(outcome.report.components.ml.ml_probability, 0.5);
}

#[tokio::test]
async fn test_forensic_risk_grows_with_anomaly_intensity() {
    let mut previous = 0.0;
    for intensity in [60u8, 100, 140, 180, 220, 255] {
        let fixtures = TestFixtures::new("stmt_sweep");
        fixtures.write_all_signals(&[edited_page(60, intensity)]);

        let outcome = pipeline(&fixtures, Arc::new(FixedClassifier::new(Some(0.5))))
            .execute(&AnalysisRequest::new(9, DocumentId::new("stmt_sweep")))
            .await
            .unwrap();
        assert!(
            outcome.forensic_risk >= previous,
            "intensity {} gave {} after {}",
            intensity,
            outcome.forensic_risk,
            previous
        );
        previous = outcome.forensic_risk;
    }
    assert!(previous > 0.3);
}

#[tokio::test]
async fn test_single_worker_thread_config() {
    let fixtures = TestFixtures::new("stmt_serial");
    fixtures.write_all_signals(&[edited_page(60, 220)]);

    let config = ScoringConfig {
        worker_threads: 1,
        ..ScoringConfig::default()
    };
    let outcome = Pipeline::new(config, fixtures.root_path(), Arc::new(FixedClassifier::new(Some(0.5))))
        .execute(&AnalysisRequest::new(10, DocumentId::new("stmt_serial")))
        .await
        .unwrap();
    assert!(outcome.report_path.is_none());
    assert!(outcome.forensic_risk > 0.3);
}

#[tokio::test]
async fn test_preprocessed_edge_mask_restricts_ela_and_font() {
    let unmasked = score_edited_page("stmt_unmasked", |_| {}).await;
    // strokes end near row 105, the edit starts at row 120
    let masked = score_edited_page("stmt_masked", |f| {
        f.write_preprocessed(1, &text_bars_page());
    })
    .await;

    assert!(signal_score(&unmasked, Signal::Ela) > 0.3);
    assert!(signal_score(&unmasked, Signal::Font) > 0.3);
    assert_eq!(signal_score(&masked, Signal::Ela), 0.0);
    assert_eq!(signal_score(&masked, Signal::Font), 0.0);

    // compression and noise never read the mask
    assert_eq!(
        signal_score(&masked, Signal::Compression),
        signal_score(&unmasked, Signal::Compression)
    );
    assert_eq!(
        signal_score(&masked, Signal::Noise),
        signal_score(&unmasked, Signal::Noise)
    );
}

#[tokio::test]
async fn test_corrupt_preprocessed_page_scores_as_unmasked() {
    let unmasked = score_edited_page("stmt_plain", |_| {}).await;
    let corrupt = score_edited_page("stmt_bad_mask", |f| {
        f.write_corrupt_preprocessed(1);
    })
    .await;

    for signal in Signal::ALL {
        assert_eq!(signal_score(&corrupt, signal), signal_score(&unmasked, signal), "{}", signal);
    }
    assert_eq!(corrupt.forensic_risk, unmasked.forensic_risk);
    assert_eq!(
        corrupt.report.final_result.final_score,
        unmasked.report.final_result.final_score
    );
}
