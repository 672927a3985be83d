//! Export functionality for hedonic artifacts.
//!
//! CSV, JSON and JSON-lines output for assembled datasets, assembly
//! statistics and fitted models.

use hedonic_dataset::{DatasetStats, TrainingRecord};
use hedonic_model::FittedModel;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON-lines document could not be parsed.
    #[error("Invalid JSON on line {line}: {source}")]
    InvalidLine {
        /// One-based line number
        line: usize,
        /// Parser error
        source: serde_json::Error,
    },

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,

    /// One compact JSON document per line.
    JsonLines,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
            Self::JsonLines => "jsonl",
        }
    }

    /// Guess the format from a path's extension, defaulting to pretty JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Self::Csv,
            Some("jsonl" | "ndjson") => Self::JsonLines,
            _ => Self::PrettyJson,
        }
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientRow<'a> {
    /// Feature name
    pub feature: &'a str,
    /// Fitted coefficient
    pub coefficient: f64,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_string<T, I>(rows: I) -> Result<String, ExportError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn json_line<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

impl Exporter for Vec<TrainingRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::JsonLines => {
                let mut out = String::new();
                for record in self {
                    out.push_str(&json_line(record)?);
                }
                Ok(out)
            }
        }
    }
}

impl Exporter for DatasetStats {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string([self]),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::JsonLines => json_line(self),
        }
    }
}

/// CSV output is the coefficient table; JSON output is the full model
/// document, which [`FittedModel::from_json_str`] reads back.
impl Exporter for FittedModel {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_string(
                self.feature_schema
                    .feature_names
                    .iter()
                    .zip(&self.coefficients)
                    .map(|(feature, &coefficient)| CoefficientRow {
                        feature,
                        coefficient,
                    }),
            ),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::JsonLines => json_line(self),
        }
    }
}
