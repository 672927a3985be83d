#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod activity;
pub mod assemble;
pub mod error;
pub mod geocode;
pub mod index;
pub mod record;
pub mod regions;

pub use activity::ActivityCounts;
pub use assemble::{Assembled, DEFAULT_HPI_INDEX, DatasetAssembler, Lookups, Rejection, log_summary};
pub use error::{DatasetError, Result};
pub use geocode::{
    GeoPoint, GeocodeLookup, GeocodeResolution, GeocodeSummary, PostcodeInfo, RegionConfig,
    haversine_km, resolve, resolve_file,
};
pub use index::{LatestReading, RegionalIndexSeries};
pub use record::{DatasetStats, PropertyType, Tenure, TrainingRecord};
pub use regions::UkRegion;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
