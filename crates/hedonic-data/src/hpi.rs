//! House price index series files.
//!
//! One headered CSV per region, named with an embedded region slug
//! (`uk-hpi-south-east.csv`, `hpi_London.csv`). Each row contributes a
//! `YYYY-MM` key and an index value.

use crate::columns::{ColumnSpec, resolve_required};
use crate::dates::{month_key, parse_flexible_date};
use crate::error::{Result, require_exists};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const DATE: ColumnSpec = ColumnSpec::new("date", &["date", "period", "month"]);
const VALUE: ColumnSpec = ColumnSpec::new("index", &["index", "hpi", "index_sa", "value"]);

/// A single monthly index reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpiObservation {
    /// Zero-padded `YYYY-MM` key
    pub date_key: String,
    /// Index value
    pub value: f64,
}

/// An HPI file paired with the region slug found in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpiSeriesFile {
    /// Region slug embedded in the file name
    pub slug: String,
    /// Path to the file
    pub path: PathBuf,
}

/// Find the region slug embedded in a file stem.
///
/// The stem is lowercased with `_` and spaces mapped to `-`; the longest
/// matching slug wins so `north-east` is not mistaken for a shorter slug it
/// contains.
pub fn embedded_slug<'a>(stem: &str, known_slugs: &[&'a str]) -> Option<&'a str> {
    let normalized: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect();

    known_slugs
        .iter()
        .copied()
        .filter(|slug| normalized.contains(slug))
        .max_by_key(|slug| slug.len())
}

/// List the HPI CSV files in `dir` whose names embed a known region slug.
///
/// Files without a recognizable slug are logged and ignored.
///
/// # Errors
///
/// Returns [`crate::DataError::MissingSource`] if `dir` does not exist.
pub fn discover_hpi_files(dir: &Path, known_slugs: &[&str]) -> Result<Vec<HpiSeriesFile>> {
    require_exists("HPI directory", dir)?;

    let mut files = Vec::new();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match embedded_slug(&stem, known_slugs) {
            Some(slug) => files.push(HpiSeriesFile {
                slug: slug.to_string(),
                path,
            }),
            None => log::warn!("ignoring HPI file with no region slug: {}", path.display()),
        }
    }

    Ok(files)
}

/// Read every parsable observation from an HPI file.
///
/// # Errors
///
/// Returns an error if the file is missing or its header lacks a date or
/// index column.
pub fn read_hpi_file(path: &Path) -> Result<Vec<HpiObservation>> {
    require_exists("HPI file", path)?;
    read_hpi(File::open(path)?, &path.display().to_string())
}

/// Read every parsable observation from HPI CSV content.
///
/// Rows with an unparsable date or a non-finite value are skipped.
///
/// # Errors
///
/// Returns [`crate::DataError::MissingColumns`] if the header lacks a date or
/// index column.
pub fn read_hpi<R: Read>(rdr: R, source_name: &str) -> Result<Vec<HpiObservation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr);
    let header = reader.headers()?.clone();
    let idx = resolve_required(source_name, &header, &[DATE, VALUE])?;
    let (date_idx, value_idx) = (idx[0], idx[1]);

    let mut observations = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let Ok(row) = row else {
            skipped += 1;
            continue;
        };
        let date = row.get(date_idx).and_then(parse_flexible_date);
        let value = row
            .get(value_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        match (date, value) {
            (Some(date), Some(value)) => observations.push(HpiObservation {
                date_key: month_key(date),
                value,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("{source_name}: skipped {skipped} unparsable HPI rows");
    }
    Ok(observations)
}
