//! Training run: schema, split, solve, evaluate.

use crate::error::ModelError;
use crate::metrics::{ModelMetrics, evaluate};
use crate::model::FittedModel;
use crate::solver::{RegressionSolver, RidgeSolver};
use crate::split::{SplitMode, split};
use hedonic_dataset::TrainingRecord;
use hedonic_features::FeatureSchema;
use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Ridge penalty (default: 1.0)
    #[serde(default = "default_lambda")]
    pub lambda: f64,

    /// Requested split mode (default: temporal)
    #[serde(default)]
    pub split_mode: SplitMode,

    /// Share of records assigned to the test set by a random split (default: 0.2)
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    /// Random split seed (default: 42)
    #[serde(default = "default_seed")]
    pub seed: u64,
}

const fn default_lambda() -> f64 {
    1.0
}

const fn default_test_ratio() -> f64 {
    0.2
}

const fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            lambda: default_lambda(),
            split_mode: SplitMode::default(),
            test_ratio: default_test_ratio(),
            seed: default_seed(),
        }
    }
}

impl TrainingConfig {
    /// Check the parameters are in range.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for a negative or non-finite
    /// lambda, or a test ratio outside `(0, 1)`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }
}

/// Fits a [`FittedModel`] to a record set.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    /// Create a trainer with the given configuration
    pub const fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on `records`.
    ///
    /// The schema is fitted on the full record set; coefficients on the
    /// training partition only.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, an empty dataset or training
    /// partition, and a singular normal-equations matrix.
    pub fn train(&self, records: Vec<TrainingRecord>) -> Result<FittedModel, ModelError> {
        self.config.validate()?;
        if records.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let schema = FeatureSchema::fit(&records)?;
        let parts = split(
            records,
            self.config.split_mode,
            self.config.test_ratio,
            self.config.seed,
        );
        if parts.train.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let x = schema.encode_all(&parts.train);
        let y: Array1<f64> = parts.train.iter().map(|r| r.log_price).collect();
        let coefficients = RidgeSolver::with_lambda(self.config.lambda).fit(&x, &y)?;

        let mut model = FittedModel {
            feature_schema: schema,
            coefficients: coefficients.to_vec(),
            lambda: self.config.lambda,
            split_mode: parts.mode_used,
            metrics: ModelMetrics::default(),
            train_size: parts.train.len(),
            test_size: parts.test.len(),
        };
        model.metrics = ModelMetrics {
            train: evaluate(&parts.train, |r| model.predict_log_price(r)),
            test: evaluate(&parts.test, |r| model.predict_log_price(r)),
        };

        info!(
            "Trained on {} records (lambda {}): train R² {:.3}, test R² {:.3}, test MAPE {:.1}%",
            model.train_size,
            model.lambda,
            model.metrics.train.r2,
            model.metrics.test.r2,
            model.metrics.test.mape * 100.0
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-0.1, 0.2)]
    #[case(f64::NAN, 0.2)]
    #[case(1.0, 0.0)]
    #[case(1.0, 1.0)]
    #[case(1.0, -0.5)]
    fn test_invalid_config(#[case] lambda: f64, #[case] test_ratio: f64) {
        let config = TrainingConfig {
            lambda,
            test_ratio,
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_dataset() {
        let trainer = ModelTrainer::default();
        assert!(matches!(trainer.train(Vec::new()), Err(ModelError::EmptyDataset)));
    }

    #[test]
    fn test_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.lambda, 1.0);
        assert_eq!(config.split_mode, SplitMode::Temporal);
        assert_eq!(config.test_ratio, 0.2);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }
}
