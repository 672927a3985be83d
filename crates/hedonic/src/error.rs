//! Error types for pipeline runs.

use hedonic_data::DataError;
use hedonic_dataset::DatasetError;
use hedonic_model::ModelError;
use hedonic_output::ExportError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for a run
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A source could not be read
    #[error(transparent)]
    Data(#[from] DataError),

    /// Lookups could not be built
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Training failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An artifact could not be written or read back
    #[error(transparent)]
    Export(#[from] ExportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the run failed on its inputs or configuration rather than on
    /// the data or the model.
    pub const fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) | Self::Toml(_) => true,
            Self::Data(err) => err.is_configuration(),
            Self::Dataset(err) => err.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_configuration_classification() {
        assert!(PipelineError::Config("bad".to_string()).is_configuration());

        let missing = PipelineError::from(DataError::MissingSource {
            kind: "gazetteer",
            path: PathBuf::from("/nowhere.csv"),
        });
        assert!(missing.is_configuration());
        assert!(missing.to_string().contains("gazetteer"));

        let empty = PipelineError::from(ModelError::EmptyDataset);
        assert!(!empty.is_configuration());
    }
}
