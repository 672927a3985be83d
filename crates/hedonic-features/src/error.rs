//! Error types for feature encoding.

use thiserror::Error;

/// Errors that can occur while fitting or applying a feature schema.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// No records to fit a schema on
    #[error("Cannot fit a feature schema on an empty dataset")]
    EmptyDataset,

    /// The schema's parts disagree with each other
    #[error("Inconsistent feature schema: {0}")]
    InconsistentSchema(String),
}
