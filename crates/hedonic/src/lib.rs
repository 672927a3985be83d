#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use hedonic_data as data;
pub use hedonic_dataset as dataset;
pub use hedonic_features as features;
pub use hedonic_model as model;
pub use hedonic_output as output;

pub use config::{DEFAULT_CONFIG, OutputConfig, RunConfig, SourcesConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{
    BuildProgress, BuildSummary, NoProgress, RunOutcome, Sources, build_dataset,
    build_dataset_with_progress, load_model, run, run_with_progress, train_from_dataset,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
