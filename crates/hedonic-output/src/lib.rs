#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hedonic/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod jsonl;
pub mod report;

pub use export::{CoefficientRow, ExportError, ExportFormat, Exporter};
pub use jsonl::{JsonLinesWriter, parse_json_lines, read_json_lines};
pub use report::{DEFAULT_TOP_COEFFICIENTS, RunReport};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
