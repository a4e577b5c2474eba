//! Error types and handling for the forensic scoring library
//! Author: kartik4091
//! Created: 2025-07-14 09:12:40 UTC

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for scoring operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for scoring operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Signal directory missing: {0}")]
    MissingSignalDirectory(PathBuf),

    #[error("No forensics output folder found under {0}")]
    ForensicsFolderNotFound(PathBuf),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Metadata error: {0}")]
    MetadataError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl Error {
    /// Whether the pipeline can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnreadableImage { .. }
                | Error::MissingSignalDirectory(_)
                | Error::ClassifierUnavailable(_)
                | Error::MetadataError(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::InternalError(format!("scoring task failed: {}", err))
    }
}
