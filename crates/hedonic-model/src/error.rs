//! Error types for model training.

use crate::solver::SolverError;
use hedonic_features::FeatureError;
use thiserror::Error;

/// Errors that can occur while training or loading a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No records to train on
    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    /// Training parameters are out of range
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    /// A loaded model does not agree with its own schema
    #[error("Inconsistent model: {0}")]
    InconsistentModel(String),

    /// Feature encoding error
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Regression solver error
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
