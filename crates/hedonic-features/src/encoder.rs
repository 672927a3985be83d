//! Feature encoder.
//!
//! [`FeatureSchema::fit`] fixes the feature order, the z-score parameters of
//! the numeric features and the outcode vocabulary; [`FeatureSchema::encode`]
//! turns a record into a vector of exactly `feature_names.len()` values.

use crate::error::FeatureError;
use crate::registry::{OUTCODE_PREFIX, numeric_feature_names};
use hedonic_dataset::{PropertyType, Tenure, TrainingRecord};
use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lower bound applied to a variance before taking its square root.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Name of the constant term.
pub const INTERCEPT: &str = "intercept";

/// A numeric feature and how it is read from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericFeature {
    DistanceKm,
    DistanceKm2,
    HpiIndex,
    PlanningCount12m,
    SaleYear,
}

impl NumericFeature {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "distanceKm" => Some(Self::DistanceKm),
            "distanceKm2" => Some(Self::DistanceKm2),
            "hpiIndex" => Some(Self::HpiIndex),
            "planningCount12m" => Some(Self::PlanningCount12m),
            "saleYear" => Some(Self::SaleYear),
            _ => None,
        }
    }

    fn value(self, record: &TrainingRecord) -> f64 {
        match self {
            Self::DistanceKm => record.distance_km,
            Self::DistanceKm2 => record.distance_km * record.distance_km,
            Self::HpiIndex => record.hpi_index,
            Self::PlanningCount12m => f64::from(record.planning_count_12m),
            Self::SaleYear => f64::from(record.year),
        }
    }
}

/// Z-score parameters of one numeric feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    /// Population mean
    pub mean: f64,
    /// Population standard deviation, floored via [`VARIANCE_FLOOR`]
    pub std: f64,
}

impl Default for Scaling {
    fn default() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }
}

impl Scaling {
    /// Fit population mean and standard deviation.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.max(VARIANCE_FLOOR).sqrt(),
        }
    }

    /// Standardize a raw value.
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Indicator name for an indicated property type.
pub fn property_type_feature(property_type: PropertyType) -> String {
    format!("type_{}", property_type.code())
}

/// Indicator name for an outcode.
pub fn outcode_feature(outcode: &str) -> String {
    format!("{OUTCODE_PREFIX}{outcode}")
}

/// Fitted encoding of training records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSchema {
    /// Every feature, in vector order
    pub feature_names: Vec<String>,
    /// The standardized numeric features, in vector order
    pub numeric_feature_names: Vec<String>,
    /// Z-score parameters per numeric feature
    pub scaling: BTreeMap<String, Scaling>,
    /// Outcodes seen when fitting, sorted
    pub outcodes: Vec<String>,
    /// The first sorted outcode, encoded as all-zero dummies
    pub base_outcode: String,
}

impl FeatureSchema {
    /// Fit the schema on the full record set.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::EmptyDataset`] if `records` is empty.
    pub fn fit(records: &[TrainingRecord]) -> Result<Self, FeatureError> {
        if records.is_empty() {
            return Err(FeatureError::EmptyDataset);
        }

        let numeric_feature_names: Vec<String> =
            numeric_feature_names().into_iter().map(String::from).collect();

        let mut scaling = BTreeMap::new();
        for name in &numeric_feature_names {
            let Some(feature) = NumericFeature::from_name(name) else {
                continue;
            };
            let values: Vec<f64> = records.iter().map(|r| feature.value(r)).collect();
            scaling.insert(name.clone(), Scaling::fit(&values));
        }

        let outcodes: Vec<String> = records
            .iter()
            .map(|r| r.outcode.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let base_outcode = outcodes.first().cloned().unwrap_or_default();

        let feature_names = layout(&numeric_feature_names, &outcodes);
        info!(
            "Fitted feature schema: {} features, {} outcodes (baseline {})",
            feature_names.len(),
            outcodes.len(),
            base_outcode
        );

        Ok(Self {
            feature_names,
            numeric_feature_names,
            scaling,
            outcodes,
            base_outcode,
        })
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    /// Whether the schema has no features.
    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    /// Position of `outcode`'s dummy within the outcode segment.
    ///
    /// `None` for the baseline and for outcodes not seen when fitting.
    pub fn outcode_dummy(&self, outcode: &str) -> Option<usize> {
        let dummies = self.outcodes.get(1..)?;
        dummies.binary_search_by(|o| o.as_str().cmp(outcode)).ok()
    }

    /// Offset of the first outcode dummy in the vector.
    pub fn outcode_offset(&self) -> usize {
        1 + self.numeric_feature_names.len() + PropertyType::INDICATED.len() + 2
    }

    /// Encode one record.
    pub fn encode(&self, record: &TrainingRecord) -> Array1<f64> {
        Array1::from(self.values(record))
    }

    /// Encode records as the rows of a design matrix.
    pub fn encode_all(&self, records: &[TrainingRecord]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), self.len()));
        for (mut row, record) in matrix.rows_mut().into_iter().zip(records) {
            row.assign(&self.encode(record));
        }
        matrix
    }

    fn values(&self, record: &TrainingRecord) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.len());
        values.push(1.0);
        for name in &self.numeric_feature_names {
            let raw = NumericFeature::from_name(name).map_or(0.0, |f| f.value(record));
            let scaling = self.scaling.get(name).copied().unwrap_or_default();
            values.push(scaling.apply(raw));
        }
        for property_type in PropertyType::INDICATED {
            values.push(indicator(record.property_type == property_type));
        }
        values.push(indicator(record.new_build));
        values.push(indicator(record.tenure == Tenure::Leasehold));

        let dummies = self.outcodes.len().saturating_sub(1);
        let hit = self.outcode_dummy(&record.outcode);
        values.extend((0..dummies).map(|i| indicator(hit == Some(i))));
        values
    }

    /// Check that the names, scaling and outcode vocabulary agree.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InconsistentSchema`] describing the first disagreement.
    pub fn validate(&self) -> Result<(), FeatureError> {
        for name in &self.numeric_feature_names {
            if NumericFeature::from_name(name).is_none() {
                return Err(FeatureError::InconsistentSchema(format!(
                    "unknown numeric feature '{name}'"
                )));
            }
            match self.scaling.get(name) {
                Some(s) if s.mean.is_finite() && s.std.is_finite() && s.std > 0.0 => {}
                _ => {
                    return Err(FeatureError::InconsistentSchema(format!(
                        "missing or invalid scaling for '{name}'"
                    )));
                }
            }
        }
        if !self.outcodes.windows(2).all(|w| w[0] < w[1]) {
            return Err(FeatureError::InconsistentSchema(
                "outcodes are not sorted and unique".to_string(),
            ));
        }
        if self.outcodes.first().map_or("", String::as_str) != self.base_outcode {
            return Err(FeatureError::InconsistentSchema(format!(
                "base outcode '{}' is not the first outcode",
                self.base_outcode
            )));
        }
        if self.feature_names != layout(&self.numeric_feature_names, &self.outcodes) {
            return Err(FeatureError::InconsistentSchema(
                "feature names do not match the encoding layout".to_string(),
            ));
        }
        Ok(())
    }
}

const fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

fn layout(numeric_feature_names: &[String], outcodes: &[String]) -> Vec<String> {
    let mut names = vec![INTERCEPT.to_string()];
    names.extend(numeric_feature_names.iter().cloned());
    names.extend(PropertyType::INDICATED.into_iter().map(property_type_feature));
    names.push("newBuild".to_string());
    names.push("leasehold".to_string());
    names.extend(outcodes.iter().skip(1).map(|o| outcode_feature(o)));
    names
}

/// Fit a schema on `records`. See [`FeatureSchema::fit`].
pub fn fit_schema(records: &[TrainingRecord]) -> Result<FeatureSchema, FeatureError> {
    FeatureSchema::fit(records)
}

/// Encode one record with `schema`. See [`FeatureSchema::encode`].
pub fn encode(record: &TrainingRecord, schema: &FeatureSchema) -> Array1<f64> {
    schema.encode(record)
}
