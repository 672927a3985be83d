//! Feature Registry
//!
//! Static metadata for every feature family the encoder can emit.

use std::collections::HashMap;

/// Prefix of the per-outcode indicator features.
pub const OUTCODE_PREFIX: &str = "outcode_";

/// Feature families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Constant term, never regularized
    Intercept,
    /// Continuous value, standardized with fitted mean and standard deviation
    Numeric,
    /// Property type indicator
    PropertyType,
    /// Binary flag
    Binary,
    /// Outcode one-hot indicator
    Outcode,
}

/// Feature metadata
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    /// Feature name as it appears in `featureNames`
    pub name: &'static str,
    /// Feature family
    pub kind: FeatureKind,
    /// What the feature measures
    pub description: &'static str,
    /// Training record field the value is derived from
    pub source_field: &'static str,
}

/// Get all fixed features, in encoding order.
///
/// Outcode indicators depend on the fitted data and are described by a single
/// `outcode_*` entry at the end.
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: "intercept",
            kind: FeatureKind::Intercept,
            description: "Constant term",
            source_field: "",
        },
        // Numeric
        FeatureInfo {
            name: "distanceKm",
            kind: FeatureKind::Numeric,
            description: "Great-circle distance from the region centre",
            source_field: "distanceKm",
        },
        FeatureInfo {
            name: "distanceKm2",
            kind: FeatureKind::Numeric,
            description: "Squared distance, for non-linear falloff with distance",
            source_field: "distanceKm",
        },
        FeatureInfo {
            name: "hpiIndex",
            kind: FeatureKind::Numeric,
            description: "Regional house price index at the transfer month",
            source_field: "hpiIndex",
        },
        FeatureInfo {
            name: "planningCount12m",
            kind: FeatureKind::Numeric,
            description: "Planning applications nearby in the trailing 12 months",
            source_field: "planningCount12m",
        },
        FeatureInfo {
            name: "saleYear",
            kind: FeatureKind::Numeric,
            description: "Transfer year, as a trend proxy",
            source_field: "year",
        },
        // Property type (O is the reference level)
        FeatureInfo {
            name: "type_D",
            kind: FeatureKind::PropertyType,
            description: "Detached house",
            source_field: "propertyType",
        },
        FeatureInfo {
            name: "type_S",
            kind: FeatureKind::PropertyType,
            description: "Semi-detached house",
            source_field: "propertyType",
        },
        FeatureInfo {
            name: "type_T",
            kind: FeatureKind::PropertyType,
            description: "Terraced house",
            source_field: "propertyType",
        },
        FeatureInfo {
            name: "type_F",
            kind: FeatureKind::PropertyType,
            description: "Flat or maisonette",
            source_field: "propertyType",
        },
        // Binary
        FeatureInfo {
            name: "newBuild",
            kind: FeatureKind::Binary,
            description: "Newly built property",
            source_field: "newBuild",
        },
        FeatureInfo {
            name: "leasehold",
            kind: FeatureKind::Binary,
            description: "Leasehold tenure",
            source_field: "tenure",
        },
        // Outcode
        FeatureInfo {
            name: "outcode_*",
            kind: FeatureKind::Outcode,
            description: "Outward code indicator; the first sorted outcode is the baseline",
            source_field: "outcode",
        },
    ]
}

/// Get features by kind
pub fn features_by_kind(kind: FeatureKind) -> Vec<FeatureInfo> {
    available_features()
        .into_iter()
        .filter(|f| f.kind == kind)
        .collect()
}

/// Names of the numeric features, in encoding order.
pub fn numeric_feature_names() -> Vec<&'static str> {
    features_by_kind(FeatureKind::Numeric)
        .into_iter()
        .map(|f| f.name)
        .collect()
}

/// Get feature info by name. `outcode_SE20` resolves to the outcode family.
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    if name.starts_with(OUTCODE_PREFIX) {
        return features_by_kind(FeatureKind::Outcode).into_iter().next();
    }
    available_features().into_iter().find(|f| f.name == name)
}

/// Count features by kind
pub fn count_by_kind() -> HashMap<FeatureKind, usize> {
    let mut counts = HashMap::new();
    for feature in available_features() {
        *counts.entry(feature.kind).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_features_count() {
        // 12 fixed features plus the outcode family
        assert_eq!(available_features().len(), 13);
    }

    #[test]
    fn test_features_by_kind() {
        let counts = count_by_kind();
        assert_eq!(counts[&FeatureKind::Intercept], 1);
        assert_eq!(counts[&FeatureKind::Numeric], 5);
        assert_eq!(counts[&FeatureKind::PropertyType], 4);
        assert_eq!(counts[&FeatureKind::Binary], 2);
        assert_eq!(counts[&FeatureKind::Outcode], 1);
    }

    #[test]
    fn test_numeric_order() {
        assert_eq!(
            numeric_feature_names(),
            vec!["distanceKm", "distanceKm2", "hpiIndex", "planningCount12m", "saleYear"]
        );
    }

    #[test]
    fn test_get_feature_info() {
        let info = get_feature_info("hpiIndex").unwrap();
        assert_eq!(info.kind, FeatureKind::Numeric);

        let info = get_feature_info("outcode_SE20").unwrap();
        assert_eq!(info.kind, FeatureKind::Outcode);

        assert!(get_feature_info("bedrooms").is_none());
    }
}
