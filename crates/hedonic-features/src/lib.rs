#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod encoder;
pub mod error;
pub mod registry;

pub use encoder::{FeatureSchema, INTERCEPT, Scaling, VARIANCE_FLOOR, encode, fit_schema};
pub use error::FeatureError;
pub use registry::{FeatureInfo, FeatureKind, available_features, features_by_kind, get_feature_info};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
