#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod dates;
pub mod error;
pub mod gazetteer;
pub mod hpi;
pub mod planning;
pub mod postcode;
pub mod price_paid;

pub use error::{DataError, Result};
pub use gazetteer::{GazetteerReader, PostcodeRecord};
pub use hpi::{HpiObservation, HpiSeriesFile, discover_hpi_files, read_hpi_file};
pub use planning::{PlanningRecord, read_planning_records};
pub use price_paid::{PricePaidReader, RawTransaction, price_paid_files};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
