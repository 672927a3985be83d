//! Postcode gazetteer reader.
//!
//! Streams a headered postcode directory CSV (ONSPD, Code-Point style or a
//! `postcode,latitude,longitude` extract) into [`PostcodeRecord`] values.
//! Column resolution happens once, when the reader is constructed; a header
//! without postcode, latitude and longitude columns is a configuration error.

use crate::columns::{ColumnSpec, resolve_required};
use crate::error::{Result, require_exists};
use crate::postcode;
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const POSTCODE: ColumnSpec = ColumnSpec::new("postcode", &["pcds", "pcd", "pcd2", "postcode"]);
const LATITUDE: ColumnSpec = ColumnSpec::new("latitude", &["lat", "latitude"]);
const LONGITUDE: ColumnSpec = ColumnSpec::new("longitude", &["long", "lon", "lng", "longitude"]);
const TERMINATED: ColumnSpec = ColumnSpec::new(
    "termination date",
    &["doterm", "terminated", "termination_date", "date_of_termination"],
);

/// One row of the postcode gazetteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeRecord {
    /// Postcode as published (not normalized)
    pub postcode: String,
    /// Leading letters of the outcode (at most two)
    pub outcode_area: String,
    /// WGS84 latitude; NaN when the source cell was unparsable
    pub latitude: f64,
    /// WGS84 longitude; NaN when the source cell was unparsable
    pub longitude: f64,
    /// Whether the postcode has a termination date
    pub is_terminated: bool,
}

impl PostcodeRecord {
    /// Build a record, deriving the outcode area from the postcode.
    pub fn new(postcode: &str, latitude: f64, longitude: f64, is_terminated: bool) -> Self {
        let normalized = postcode::normalize(postcode);
        let outcode_area = postcode::area_letters(postcode::outcode(&normalized))
            .chars()
            .take(2)
            .collect();
        Self {
            postcode: postcode.to_string(),
            outcode_area,
            latitude,
            longitude,
            is_terminated,
        }
    }
}

/// Resolved column positions for a gazetteer file.
#[derive(Debug, Clone, Copy)]
struct GazetteerColumns {
    postcode: usize,
    latitude: usize,
    longitude: usize,
    terminated: Option<usize>,
}

/// Streaming reader over a postcode gazetteer CSV.
#[derive(Debug)]
pub struct GazetteerReader<R> {
    reader: Reader<R>,
    columns: GazetteerColumns,
}

impl GazetteerReader<File> {
    /// Open a gazetteer file, resolving its header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::MissingSource`] if the file does not exist and
    /// [`crate::DataError::MissingColumns`] if the header lacks a required column.
    pub fn from_path(path: &Path) -> Result<Self> {
        require_exists("gazetteer", path)?;
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> GazetteerReader<R> {
    /// Wrap any reader, resolving its header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::MissingColumns`] if the header lacks a required column.
    pub fn from_reader(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);
        let header = reader.headers()?.clone();
        let idx = resolve_required("gazetteer", &header, &[POSTCODE, LATITUDE, LONGITUDE])?;
        let columns = GazetteerColumns {
            postcode: idx[0],
            latitude: idx[1],
            longitude: idx[2],
            terminated: TERMINATED.find(&header),
        };
        log::debug!("gazetteer columns resolved: {columns:?}");
        Ok(Self { reader, columns })
    }

    /// Iterate over the gazetteer rows.
    ///
    /// Rows the CSV layer cannot decode are logged and skipped; they never
    /// abort the scan.
    pub fn records(&mut self) -> impl Iterator<Item = PostcodeRecord> + '_ {
        let columns = self.columns;
        self.reader
            .records()
            .filter_map(move |row| match row {
                Ok(row) => Some(parse_row(&row, columns)),
                Err(e) => {
                    log::debug!("skipping undecodable gazetteer row: {e}");
                    None
                }
            })
    }
}

fn parse_row(row: &StringRecord, columns: GazetteerColumns) -> PostcodeRecord {
    let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
    let coordinate = |idx: usize| cell(idx).parse::<f64>().unwrap_or(f64::NAN);
    let is_terminated = columns.terminated.is_some_and(|idx| !cell(idx).is_empty());

    PostcodeRecord::new(
        cell(columns.postcode),
        coordinate(columns.latitude),
        coordinate(columns.longitude),
        is_terminated,
    )
}
