//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading source data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column could not be resolved from the header row
    #[error("{source_name}: missing required column(s) {missing:?} (header: {header:?})")]
    MissingColumns {
        /// Human-readable name of the source being read
        source_name: String,
        /// Logical names of the columns that could not be resolved
        missing: Vec<String>,
        /// Header row as read from the file
        header: Vec<String>,
    },

    /// A source file or directory does not exist
    #[error("Missing source {kind}: {}", .path.display())]
    MissingSource {
        /// What the path was expected to hold (e.g. "gazetteer")
        kind: &'static str,
        /// Path that was checked
        path: PathBuf,
    },

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether this error describes malformed configuration rather than bad data.
    ///
    /// Configuration errors abort the run; everything else is reported per source.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingColumns { .. } | Self::MissingSource { .. })
    }
}

/// Fail with [`DataError::MissingSource`] unless `path` exists.
pub fn require_exists(kind: &'static str, path: &std::path::Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DataError::MissingSource {
            kind,
            path: path.to_path_buf(),
        })
    }
}
