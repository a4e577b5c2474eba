
use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Explicit identity of the document being scored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the id from an uploaded file name, `uploads/17677_Statement.pdf` -> `17677_Statement`
    pub fn from_pdf_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rendered page's diagnostic image on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Page index parsed from `page-<n>`, if the name follows that pattern
    pub index: Option<u32>,
    pub file_name: String,
    pub path: PathBuf,
}

impl PageRef {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let index = parse_page_index(&file_name);
        Self { index, file_name, path }
    }
}

fn parse_page_index(file_name: &str) -> Option<u32> {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    stem.strip_prefix("page-")?.parse().ok()
}

/// Authoring-tool properties read from the PDF Info dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub producer: Option<String>,
    pub creator: Option<String>,
}

impl DocumentMetadata {
    /// Lower-cased `producer creator` text used for signature matching
    pub fn signature_text(&self) -> String {
        let producer = self.producer.as_deref().unwrap_or("");
        let creator = self.creator.as_deref().unwrap_or("");
        format!("{} {}", producer, creator).trim().to_lowercase()
    }
}
