use docforensics::{
    analyzer::{DiagnosticImage, DiagnosticImageStats, PageStats},
    config::{RegionConfig, SignalConfig},
    forensics::{list_pages, ForensicsLayout},
    metadata::{MetadataScorer, SourceClass},
    scoring::PageScorer,
    types::{LowContentReason, PageOutcome},
    DocumentId, Signal,
};
use image::DynamicImage;

use crate::fixtures::{clean_page, edited_page, TestFixtures};

fn page_score(signal: Signal, config: SignalConfig, page: image::GrayImage) -> PageOutcome {
    let image = DiagnosticImage::from_dynamic(&DynamicImage::ImageLuma8(page));
    let stats = DiagnosticImageStats::new(config.clone(), RegionConfig::default()).extract(&image, None);
    PageScorer::new(signal, config).score(&stats)
}

#[test]
fn test_clean_page_scores_zero_for_every_signal() {
    for (signal, config) in [
        (Signal::Ela, SignalConfig::ela()),
        (Signal::Compression, SignalConfig::compression()),
        (Signal::Noise, SignalConfig::noise()),
        (Signal::Font, SignalConfig::font()),
    ] {
        let outcome = page_score(signal, config, clean_page());
        assert_eq!(outcome.contribution(), Some(0.0), "{} {:?}", signal, outcome);
    }
}

#[test]
fn test_compression_score_grows_with_edited_area() {
    let mut previous = 0.0;
    for side in [20, 40, 60, 80, 100] {
        let outcome = page_score(Signal::Compression, SignalConfig::compression(), edited_page(side, 200));
        let score = outcome.contribution().unwrap();
        assert!(score >= previous, "side {} scored {} after {}", side, score, previous);
        previous = score;
    }
    assert!(previous > 0.5);
}

#[test]
fn test_blank_residual_is_low_content() {
    let blank = image::GrayImage::new(200, 200);
    let image = DiagnosticImage::from_dynamic(&DynamicImage::ImageLuma8(blank));
    let stats = DiagnosticImageStats::new(SignalConfig::ela(), RegionConfig::default()).extract(&image, None);
    assert!(matches!(
        stats,
        PageStats::LowContent(LowContentReason::SparseActivity { .. })
    ));
    assert_eq!(
        PageScorer::new(Signal::Ela, SignalConfig::ela()).score(&stats).contribution(),
        Some(0.0)
    );
}

#[test]
fn test_small_page_has_too_few_patches() {
    let small = image::GrayImage::from_pixel(60, 60, image::Luma([40u8]));
    let image = DiagnosticImage::from_dynamic(&DynamicImage::ImageLuma8(small));
    let stats =
        DiagnosticImageStats::new(SignalConfig::noise(), RegionConfig::default()).extract(&image, None);
    assert!(matches!(
        stats,
        PageStats::LowContent(LowContentReason::TooFewPatches { count: 36 })
    ));
}

#[test]
fn test_layout_lists_pages_in_order() {
    let fixtures = TestFixtures::new("stmt_pages");
    for page in [3, 1, 12, 2] {
        fixtures.write_page(Signal::Ela, page, &clean_page());
    }
    let layout = ForensicsLayout::resolve(fixtures.root_path(), &DocumentId::new("stmt_pages")).unwrap();
    let pages = list_pages(&layout.signal_dir(Signal::Ela)).unwrap();
    let indices: Vec<_> = pages.iter().filter_map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 12]);
}

#[test]
fn test_metadata_scoring_from_pdf() {
    let fixtures = TestFixtures::new("stmt_meta");
    let scorer = MetadataScorer::default();

    let pdf = fixtures.write_pdf(Some("GPL Ghostscript"), Some("GIMP 2.10"));
    let assessment = scorer.score_pdf(&pdf);
    assert_eq!(assessment.class, SourceClass::ImageEditor);
    assert_eq!(assessment.score, 0.8);

    let pdf = fixtures.write_pdf(None, None);
    assert_eq!(scorer.score_pdf(&pdf).class, SourceClass::Absent);
}
