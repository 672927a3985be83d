//! Fitted model
//!
//! The persisted result of a training run: the feature schema needed to
//! encode new records, one coefficient per feature, the training settings and
//! the evaluation metrics.

use crate::error::ModelError;
use crate::metrics::ModelMetrics;
use crate::split::SplitMode;
use hedonic_dataset::TrainingRecord;
use hedonic_features::{FeatureSchema, INTERCEPT};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A trained hedonic price model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedModel {
    /// Encoding used for training
    pub feature_schema: FeatureSchema,
    /// Coefficients, in `feature_schema.feature_names` order
    pub coefficients: Vec<f64>,
    /// Ridge penalty
    pub lambda: f64,
    /// Split mode actually used
    pub split_mode: SplitMode,
    /// Train and test metrics
    pub metrics: ModelMetrics,
    /// Records in the training partition
    #[serde(default)]
    pub train_size: usize,
    /// Records in the test partition
    #[serde(default)]
    pub test_size: usize,
}

impl FittedModel {
    /// Predicted natural log of the price.
    ///
    /// Outcodes not seen in training encode as the baseline outcode.
    pub fn predict_log_price(&self, record: &TrainingRecord) -> f64 {
        let features = self.feature_schema.encode(record);
        features.dot(&ArrayView1::from(self.coefficients.as_slice()))
    }

    /// Predicted price.
    pub fn predict_price(&self, record: &TrainingRecord) -> f64 {
        self.predict_log_price(record).exp()
    }

    /// Coefficient of a feature by name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.feature_schema
            .feature_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.coefficients.get(i).copied())
    }

    /// The intercept.
    pub fn intercept(&self) -> f64 {
        self.coefficient(INTERCEPT).unwrap_or(0.0)
    }

    /// Non-intercept coefficients ordered by decreasing magnitude.
    pub fn top_coefficients(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .feature_schema
            .feature_names
            .iter()
            .map(String::as_str)
            .zip(self.coefficients.iter().copied())
            .filter(|(name, _)| *name != INTERCEPT)
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked.truncate(n);
        ranked
    }

    /// Check that the schema is consistent and there is one coefficient per feature.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Feature`] for an inconsistent schema and
    /// [`ModelError::InconsistentModel`] for a coefficient count mismatch or
    /// non-finite coefficients.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.feature_schema.validate()?;
        if self.coefficients.len() != self.feature_schema.len() {
            return Err(ModelError::InconsistentModel(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_schema.len()
            )));
        }
        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ModelError::InconsistentModel(format!(
                "coefficient for '{}' is not finite",
                self.feature_schema.feature_names[i]
            )));
        }
        Ok(())
    }

    /// Load a model from its JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Fails if the JSON does not describe a model or the model is inconsistent.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use hedonic_dataset::{PropertyType, Tenure};

    fn record(outcode: &str, distance_km: f64, price: f64) -> TrainingRecord {
        TrainingRecord {
            id: format!("{outcode}-{distance_km}"),
            price,
            log_price: price.ln(),
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            year: 2023,
            month: 1,
            postcode: format!("{outcode}1AA"),
            outcode: outcode.to_string(),
            property_type: PropertyType::Flat,
            new_build: false,
            tenure: Tenure::Leasehold,
            district: "BROMLEY".to_string(),
            distance_km,
            hpi_index: 100.0,
            planning_count_12m: 0,
        }
    }

    fn model() -> FittedModel {
        let records = vec![record("BR3", 1.0, 300_000.0), record("SE20", 3.0, 250_000.0)];
        let feature_schema = FeatureSchema::fit(&records).unwrap();
        let mut coefficients = vec![0.0; feature_schema.len()];
        coefficients[0] = 12.0;
        let last = coefficients.len() - 1;
        coefficients[last] = 0.5;
        FittedModel {
            feature_schema,
            coefficients,
            lambda: 1.0,
            split_mode: SplitMode::Random,
            metrics: ModelMetrics::default(),
            train_size: 2,
            test_size: 0,
        }
    }

    #[test]
    fn test_predict() {
        let model = model();
        assert_abs_diff_eq!(model.predict_log_price(&record("BR3", 2.0, 1.0)), 12.0);
        assert_abs_diff_eq!(model.predict_log_price(&record("SE20", 2.0, 1.0)), 12.5);
        assert_abs_diff_eq!(model.predict_price(&record("BR3", 2.0, 1.0)), 12f64.exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_unseen_outcode_scores_as_baseline() {
        let model = model();
        assert_abs_diff_eq!(model.predict_log_price(&record("E1", 2.0, 1.0)), 12.0);
    }

    #[test]
    fn test_coefficient_lookup() {
        let model = model();
        assert_eq!(model.intercept(), 12.0);
        assert_eq!(model.coefficient("outcode_SE20"), Some(0.5));
        assert_eq!(model.coefficient("outcode_BR3"), None);

        let top = model.top_coefficients(1);
        assert_eq!(top, vec![("outcode_SE20", 0.5)]);
    }

    #[test]
    fn test_json_round_trip() {
        let model = model();
        let json = serde_json::to_string_pretty(&model).unwrap();
        assert!(json.contains("\"featureSchema\""));
        assert!(json.contains("\"splitMode\": \"random\""));

        let back = FittedModel::from_json_str(&json).unwrap();
        assert_eq!(back.coefficients, model.coefficients);
        assert_eq!(back.feature_schema.feature_names, model.feature_schema.feature_names);
    }

    #[test]
    fn test_from_json_rejects_wrong_coefficient_count() {
        let mut model = model();
        model.coefficients.pop();
        let json = serde_json::to_string(&model).unwrap();
        assert!(matches!(
            FittedModel::from_json_str(&json),
            Err(ModelError::InconsistentModel(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            FittedModel::from_json_str("{\"coefficients\": []}"),
            Err(ModelError::Serialization(_))
        ));
    }
}
