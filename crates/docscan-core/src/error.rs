use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single file's content could not be read, decoded or recognized.
    #[error("Extraction failed for {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    /// A directory entry could not be listed.
    #[error("Traversal failed at {path}: {reason}")]
    Traversal { path: PathBuf, reason: String },

    /// An input bundle could not be unpacked.
    #[error("Cannot unpack archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove old report {path}: {source}")]
    RetentionCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extraction { path: path.into(), reason: reason.to_string() }
    }

    /// Errors that end a scan. Everything else is recovered where it happens.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ReportWrite { .. } | Self::Archive { .. } | Self::InvalidConfig(_) | Self::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
