#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod metrics;
pub mod model;
pub mod solver;
pub mod split;
pub mod trainer;

pub use error::ModelError;
pub use metrics::{Metrics, ModelMetrics, evaluate};
pub use model::FittedModel;
pub use solver::{
    PIVOT_TOLERANCE, RegressionSolver, RidgeConfig, RidgeSolver, SolverError, normal_equations,
    solve_linear_system,
};
pub use split::{Lcg, MIN_PARTITION_SIZE, Split, SplitMode, split};
pub use trainer::{ModelTrainer, TrainingConfig};

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
