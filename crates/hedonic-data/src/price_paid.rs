//! Price paid data reader.
//!
//! HM Land Registry publishes price paid data as a headerless CSV with a fixed
//! 16-column layout. Column offsets are confined to [`RawTransaction::from_record`];
//! everything downstream works with the typed record.

use crate::error::{Result, require_exists};
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Minimum number of fields a row needs to be worth parsing (id, price, date, postcode).
const MIN_FIELDS: usize = 4;

/// Column offsets of the Land Registry price paid layout.
mod layout {
    pub(super) const ID: usize = 0;
    pub(super) const PRICE: usize = 1;
    pub(super) const DATE: usize = 2;
    pub(super) const POSTCODE: usize = 3;
    pub(super) const PROPERTY_TYPE: usize = 4;
    pub(super) const OLD_NEW: usize = 5;
    pub(super) const DURATION: usize = 6;
    pub(super) const DISTRICT: usize = 12;
    pub(super) const RECORD_STATUS: usize = 15;
}

/// A price paid record as published, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Transaction unique identifier
    pub id: String,
    /// Sale price; NaN when the source cell was unparsable
    pub price: f64,
    /// Transfer date as published
    pub date: String,
    /// Postcode as published, if present
    pub postcode: Option<String>,
    /// Property type flag (`D`, `S`, `T`, `F` or `O`)
    pub property_type: String,
    /// Old/new flag (`Y` for a newly built property)
    pub new_build: String,
    /// Duration flag (`F` freehold, `L` leasehold)
    pub tenure: String,
    /// Local authority district name
    pub district: String,
    /// Record status (`A` added, `C` changed, `D` deleted), if present
    pub record_status: Option<String>,
}

impl RawTransaction {
    /// Parse a price paid CSV row.
    ///
    /// Returns `None` for rows too short to carry an id, price, date and postcode.
    pub fn from_record(row: &StringRecord) -> Option<Self> {
        if row.len() < MIN_FIELDS {
            return None;
        }

        let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");
        let optional = |idx: usize| {
            let value = cell(idx);
            (!value.is_empty()).then(|| value.to_string())
        };

        Some(Self {
            id: cell(layout::ID).trim_matches(['{', '}']).to_string(),
            price: cell(layout::PRICE).parse::<f64>().unwrap_or(f64::NAN),
            date: cell(layout::DATE).to_string(),
            postcode: optional(layout::POSTCODE),
            property_type: cell(layout::PROPERTY_TYPE).to_string(),
            new_build: cell(layout::OLD_NEW).to_string(),
            tenure: cell(layout::DURATION).to_string(),
            district: cell(layout::DISTRICT).to_string(),
            record_status: optional(layout::RECORD_STATUS),
        })
    }
}

fn is_header_row(row: &StringRecord) -> bool {
    row.get(layout::PRICE)
        .is_some_and(|cell| cell.trim().eq_ignore_ascii_case("price"))
}

/// Streaming reader over one price paid CSV file.
///
/// Iterating yields one [`RawTransaction`] per usable row. A leading header
/// row is detected and skipped; short or undecodable rows are counted in
/// [`PricePaidReader::skipped_rows`].
#[derive(Debug)]
pub struct PricePaidReader<R> {
    reader: Reader<R>,
    row: StringRecord,
    rows_read: u64,
    skipped_rows: u64,
    done: bool,
}

impl PricePaidReader<File> {
    /// Open a price paid file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::MissingSource`] if the file does not exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        require_exists("price paid file", path)?;
        Ok(Self::from_reader(File::open(path)?))
    }
}

impl<R: Read> PricePaidReader<R> {
    /// Wrap any reader.
    pub fn from_reader(rdr: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        Self {
            reader,
            row: StringRecord::new(),
            rows_read: 0,
            skipped_rows: 0,
            done: false,
        }
    }

    /// Rows that were too short or could not be decoded.
    pub const fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }

    /// Rows read from the underlying CSV, including skipped ones.
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl<R: Read> Iterator for PricePaidReader<R> {
    type Item = RawTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.reader.read_record(&mut self.row) {
                Ok(false) => self.done = true,
                Ok(true) => {
                    self.rows_read += 1;
                    if self.rows_read == 1 && is_header_row(&self.row) {
                        continue;
                    }
                    match RawTransaction::from_record(&self.row) {
                        Some(tx) => return Some(tx),
                        None => self.skipped_rows += 1,
                    }
                }
                Err(e) if e.is_io_error() => {
                    log::error!("price paid read aborted: {e}");
                    self.done = true;
                }
                Err(e) => {
                    self.rows_read += 1;
                    self.skipped_rows += 1;
                    log::debug!("skipping undecodable price paid row: {e}");
                }
            }
        }
        None
    }
}

/// List the price paid CSV files under `path`.
///
/// A file path is returned as-is; a directory yields its `.csv` files sorted
/// by name so runs are reproducible.
///
/// # Errors
///
/// Returns [`crate::DataError::MissingSource`] if `path` does not exist.
pub fn price_paid_files(path: &Path) -> Result<Vec<PathBuf>> {
    require_exists("price paid data", path)?;
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "\"{8A1B7A1E-0000-0000-0000-000000000001}\",\"250000\",\"2023-05-12 00:00\",\"SE20 7UA\",\"S\",\"N\",\"F\",\"12\",\"\",\"HIGH STREET\",\"\",\"LONDON\",\"BROMLEY\",\"GREATER LONDON\",\"A\",\"A\"";

    #[test]
    fn test_parses_land_registry_row() {
        let mut reader = PricePaidReader::from_reader(ROW.as_bytes());
        let tx = reader.next().unwrap();

        assert_eq!(tx.id, "8A1B7A1E-0000-0000-0000-000000000001");
        assert_eq!(tx.price, 250_000.0);
        assert_eq!(tx.date, "2023-05-12 00:00");
        assert_eq!(tx.postcode.as_deref(), Some("SE20 7UA"));
        assert_eq!(tx.property_type, "S");
        assert_eq!(tx.new_build, "N");
        assert_eq!(tx.tenure, "F");
        assert_eq!(tx.district, "BROMLEY");
        assert_eq!(tx.record_status.as_deref(), Some("A"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_skips_header_and_short_rows() {
        let data = format!(
            "id,price,date,postcode,type,new,tenure\n{ROW}\nonly,two\n{ROW}\n"
        );
        let mut reader = PricePaidReader::from_reader(data.as_bytes());
        let rows: Vec<_> = reader.by_ref().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(reader.skipped_rows(), 1);
        assert_eq!(reader.rows_read(), 4);
    }

    #[test]
    fn test_missing_optional_fields() {
        let data = "X1,abc,2023-01-01,\n";
        let mut reader = PricePaidReader::from_reader(data.as_bytes());
        let tx = reader.next().unwrap();
        assert!(tx.price.is_nan());
        assert!(tx.postcode.is_none());
        assert!(tx.record_status.is_none());
        assert_eq!(tx.district, "");
    }
}
