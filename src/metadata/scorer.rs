//! Authoring-tool signature scoring

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::extractor::extract_metadata;
use crate::{config::MetadataConfig, types::DocumentMetadata};

/// Which signature list matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceClass {
    OfficeOrProgrammatic,
    ScannerOrPrint,
    ImageEditor,
    Unknown,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAssessment {
    pub score: f64,
    pub class: SourceClass,
    pub signature: Option<String>,
}

/// Maps Producer/Creator text onto the configured risk levels
#[derive(Debug, Clone)]
pub struct MetadataScorer {
    config: MetadataConfig,
}

impl MetadataScorer {
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    /// Reads and scores a PDF; extraction failures score as absent metadata
    #[instrument(skip(self))]
    pub fn score_pdf(&self, path: &Path) -> MetadataAssessment {
        match extract_metadata(path) {
            Ok(metadata) => self.assess(metadata.as_ref()),
            Err(err) => {
                warn!("⚠️ metadata unreadable, scoring as absent: {}", err);
                self.assess(None)
            }
        }
    }

    pub fn assess(&self, metadata: Option<&DocumentMetadata>) -> MetadataAssessment {
        let Some(metadata) = metadata else {
            return MetadataAssessment {
                score: self.config.absent_score,
                class: SourceClass::Absent,
                signature: None,
            };
        };

        let text = metadata.signature_text();
        let matches = |list: &[String]| list.iter().any(|needle| text.contains(needle.as_str()));

        let (class, score) = if matches(&self.config.clean_sources)
            || matches(&self.config.programmatic_sources)
        {
            (SourceClass::OfficeOrProgrammatic, self.config.clean_score)
        } else if matches(&self.config.scanner_sources) {
            (SourceClass::ScannerOrPrint, self.config.scanner_score)
        } else if matches(&self.config.editor_sources) {
            (SourceClass::ImageEditor, self.config.editor_score)
        } else {
            (SourceClass::Unknown, self.config.unknown_score)
        };

        info!("🏭 metadata signature '{}' -> {:?} ({})", text, class, score);
        MetadataAssessment {
            score,
            class,
            signature: Some(text),
        }
    }
}

impl Default for MetadataScorer {
    fn default() -> Self {
        Self::new(MetadataConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(producer: Option<&str>, creator: Option<&str>) -> DocumentMetadata {
        DocumentMetadata {
            producer: producer.map(str::to_string),
            creator: creator.map(str::to_string),
        }
    }

    #[test]
    fn test_known_sources() {
        let scorer = MetadataScorer::default();
        assert_eq!(scorer.assess(Some(&meta(Some("Microsoft Word"), None))).score, 0.1);
        assert_eq!(scorer.assess(Some(&meta(Some("ReportLab PDF Library"), None))).score, 0.1);
        assert_eq!(scorer.assess(Some(&meta(None, Some("Xerox WorkCentre")))).score, 0.25);
        assert_eq!(scorer.assess(Some(&meta(Some("GIMP 2.10"), None))).score, 0.8);
        assert_eq!(scorer.assess(Some(&meta(Some("Acme Writer"), None))).score, 0.35);
    }

    #[test]
    fn test_clean_list_checked_before_editor() {
        let scorer = MetadataScorer::default();
        let outcome = scorer.assess(Some(&meta(Some("Adobe Photoshop"), Some("Microsoft Word"))));
        assert_eq!(outcome.class, SourceClass::OfficeOrProgrammatic);
        assert_eq!(outcome.score, 0.1);
    }

    #[test]
    fn test_absent_and_unreadable() {
        let scorer = MetadataScorer::default();
        assert_eq!(scorer.assess(None).score, 0.2);
        assert_eq!(scorer.score_pdf(Path::new("/nonexistent/statement.pdf")).score, 0.2);
    }

    #[test]
    fn test_empty_fields_are_unknown() {
        let outcome = MetadataScorer::default().assess(Some(&meta(None, None)));
        assert_eq!(outcome.class, SourceClass::Unknown);
        assert_eq!(outcome.score, 0.35);
    }
}
