//! Error taxonomy for the detector: configuration, extraction, processing, persistence.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectorError>;

/// Coarse class of a [`DetectorError`], for callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Extraction,
    Processing,
    Persistence,
}

#[derive(Error, Debug)]
pub enum DetectorError {
    /// Pipeline not ready or configured with unusable data.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Feature extraction failed for {url:?}: {reason}")]
    Extraction { url: String, reason: String },

    /// Feature assembly or inference could not produce a result.
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Bundle persistence error at {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Public suffix list error: {0}")]
    SuffixList(String),
}

impl DetectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectorError::Configuration(_) | DetectorError::SuffixList(_) => ErrorKind::Configuration,
            DetectorError::Extraction { .. } => ErrorKind::Extraction,
            DetectorError::Processing(_) => ErrorKind::Processing,
            DetectorError::Persistence { .. }
            | DetectorError::Io(_)
            | DetectorError::Json(_)
            | DetectorError::Bincode(_) => ErrorKind::Persistence,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DetectorError::Persistence {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn extraction(url: &str, reason: impl Into<String>) -> Self {
        DetectorError::Extraction {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
