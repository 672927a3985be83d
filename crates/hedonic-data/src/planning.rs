//! Planning application records.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A planning application, reduced to the fields the aggregator needs.
///
/// Listings carry many more fields (reference, description, decision);
/// unknown fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningRecord {
    /// Site postcode, if the listing carried one
    pub postcode: Option<String>,
    /// Date the application was received, as published
    pub received_date: Option<String>,
}

impl PlanningRecord {
    /// Create a planning record.
    pub fn new(postcode: impl Into<String>, received_date: impl Into<String>) -> Self {
        Self {
            postcode: Some(postcode.into()),
            received_date: Some(received_date.into()),
        }
    }
}

/// Read planning records from a JSON array file.
///
/// A missing file is not an error: no planning data is a valid state and
/// yields an empty list.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_planning_records(path: &Path) -> Result<Vec<PlanningRecord>> {
    if !path.exists() {
        log::warn!(
            "no planning records at {}; planning counts will be zero",
            path.display()
        );
        return Ok(Vec::new());
    }
    read_planning_json(BufReader::new(File::open(path)?))
}

/// Read planning records from JSON array content.
///
/// # Errors
///
/// Returns [`crate::DataError::Serialization`] if the content is not a JSON
/// array of objects.
pub fn read_planning_json<R: Read>(rdr: R) -> Result<Vec<PlanningRecord>> {
    Ok(serde_json::from_reader(rdr)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_partial_records() {
        let json = r#"[
            {"postcode": "SE20 7UA", "receivedDate": "12/03/2024", "reference": "24/0001/FULL"},
            {"postcode": null, "receivedDate": "2024-01-01"},
            {"description": "no postcode or date"}
        ]"#;
        let records = read_planning_json(json.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], PlanningRecord::new("SE20 7UA", "12/03/2024"));
        assert!(records[1].postcode.is_none());
        assert_eq!(records[2], PlanningRecord::default());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let records =
            read_planning_records(Path::new("/definitely/not/here/planning.json")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(read_planning_json("{\"postcode\": 1}".as_bytes()).is_err());
    }
}
