//! Per-document diagnostic folder resolution

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    types::{DocumentId, PageRef, Signal},
};

/// Grayscale pages the edge masks are computed from
pub const PREPROCESSED_DIR: &str = "Preprocessed";

const PAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Resolved `<root>/<folder>` holding one directory per signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForensicsLayout {
    folder: PathBuf,
    folder_name: String,
}

impl ForensicsLayout {
    /// `<root>/<document_id>`, else the most recently modified sub-directory.
    ///
    /// The fallback ranks by directory mtime, which moves whenever a direct
    /// child is added or removed; names only break equal-time ties.
    pub fn resolve(root: &Path, document_id: &DocumentId) -> Result<Self> {
        let direct = root.join(document_id.as_str());
        if direct.is_dir() {
            debug!("forensics folder matched document id: {}", direct.display());
            return Ok(Self::at(direct));
        }

        let entries = fs::read_dir(root)
            .map_err(|_| Error::ForensicsFolderNotFound(root.to_path_buf()))?;

        let latest = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, entry.file_name(), entry.path())
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, _, path)| path)
            .ok_or_else(|| Error::ForensicsFolderNotFound(root.to_path_buf()))?;

        warn!(
            "⚠️ no folder named '{}', using latest: {}",
            document_id,
            latest.display()
        );
        Ok(Self::at(latest))
    }

    fn at(folder: PathBuf) -> Self {
        let folder_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("📂 forensics folder: {}", folder.display());
        Self {
            folder,
            folder_name,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn signal_dir(&self, signal: Signal) -> PathBuf {
        self.folder.join(signal.dir_name())
    }

    pub fn preprocessed_dir(&self) -> PathBuf {
        self.folder.join(PREPROCESSED_DIR)
    }
}

/// Page images of a directory ordered by `page-<n>` index, then by name
pub fn list_pages(dir: &Path) -> Result<Vec<PageRef>> {
    let mut pages: Vec<PageRef> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_page_extension(path))
        .map(PageRef::new)
        .collect();

    pages.sort_by(|a, b| {
        (a.index.is_none(), a.index, &a.file_name).cmp(&(b.index.is_none(), b.index, &b.file_name))
    });
    Ok(pages)
}

fn has_page_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
