//! Error types for dataset assembly.

use hedonic_data::DataError;
use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that can occur while building the dataset lookups.
///
/// Per-record problems are never errors; they are counted in
/// [`DatasetStats`](crate::DatasetStats) instead.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Invalid region configuration
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// A source could not be read
    #[error(transparent)]
    Data(#[from] DataError),
}

impl DatasetError {
    /// Whether this error should abort the run as a configuration problem.
    pub const fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidRegion(_) => true,
            Self::Data(err) => err.is_configuration(),
        }
    }
}
