//! Metadata Module
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! Reads the authoring-tool fields of a PDF Info dictionary and maps the
//! tool signature to a risk level.

pub mod extractor;
pub mod scorer;

pub use extractor::{decode_pdf_string, extract_metadata};
pub use scorer::{MetadataAssessment, MetadataScorer, SourceClass};
