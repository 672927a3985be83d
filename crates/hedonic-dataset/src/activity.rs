//! Activity aggregator: trailing-window planning application counts.

use crate::error::Result;
use chrono::NaiveDate;
use hedonic_data::dates::{months_before, parse_flexible_date};
use hedonic_data::{PlanningRecord, postcode, read_planning_records};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

/// Length of the counting window, in calendar months.
pub const WINDOW_MONTHS: u32 = 12;

/// Planning application counts keyed by normalized postcode and by outcode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    by_postcode: HashMap<String, u32>,
    by_outcode: HashMap<String, u32>,
}

impl ActivityCounts {
    /// Count applications received in the [`WINDOW_MONTHS`] months up to `as_of`.
    ///
    /// Records with no parsable received date, a date before the window, or
    /// no postcode are ignored. No records at all yields empty counts.
    pub fn aggregate(records: &[PlanningRecord], as_of: NaiveDate) -> Self {
        let cutoff = months_before(as_of, WINDOW_MONTHS);
        let mut counts = Self::default();
        let mut stale = 0usize;

        for record in records {
            let Some(received) = record.received_date.as_deref().and_then(parse_flexible_date)
            else {
                continue;
            };
            if received < cutoff {
                stale += 1;
                continue;
            }
            let normalized = postcode::normalize(record.postcode.as_deref().unwrap_or_default());
            if normalized.is_empty() {
                continue;
            }

            let outcode = postcode::outcode(&normalized).to_string();
            if !outcode.is_empty() {
                *counts.by_outcode.entry(outcode).or_default() += 1;
            }
            *counts.by_postcode.entry(normalized).or_default() += 1;
        }

        debug!("{stale} planning records older than {cutoff}");
        info!(
            "Planning activity since {cutoff}: {} applications over {} postcodes",
            counts.total(),
            counts.by_postcode.len()
        );
        counts
    }

    /// Read a planning file and aggregate it. A missing file yields empty counts.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but is not a JSON array of records.
    pub fn load(path: &Path, as_of: NaiveDate) -> Result<Self> {
        let records = read_planning_records(path)?;
        Ok(Self::aggregate(&records, as_of))
    }

    /// Count for a postcode, falling back to its outcode, then to zero.
    pub fn count_for(&self, normalized_postcode: &str, outcode: &str) -> u32 {
        self.by_postcode
            .get(normalized_postcode)
            .or_else(|| self.by_outcode.get(outcode))
            .copied()
            .unwrap_or(0)
    }

    /// Exact postcode count, if any.
    pub fn postcode_count(&self, normalized_postcode: &str) -> Option<u32> {
        self.by_postcode.get(normalized_postcode).copied()
    }

    /// Outcode count, if any.
    pub fn outcode_count(&self, outcode: &str) -> Option<u32> {
        self.by_outcode.get(outcode).copied()
    }

    /// Total applications counted.
    pub fn total(&self) -> u64 {
        self.by_postcode.values().map(|&c| u64::from(c)).sum()
    }

    /// Whether nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.by_postcode.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    #[test]
    fn test_aggregate_window_and_keys() {
        let records = vec![
            PlanningRecord::new("SE20 7UA", "2024-01-15"),
            PlanningRecord::new("se207ua", "15/06/2023"),
            PlanningRecord::new("SE20 8AB", "2023-03-31"),
            PlanningRecord::new("SE20 9ZZ", "2023-03-30"),
            PlanningRecord::new("SE20 1AA", "yesterday"),
            PlanningRecord::new("   ", "2024-01-01"),
            PlanningRecord::default(),
        ];

        let counts = ActivityCounts::aggregate(&records, as_of());
        assert_eq!(counts.postcode_count("SE207UA"), Some(2));
        assert_eq!(counts.postcode_count("SE208AB"), Some(1));
        assert_eq!(counts.postcode_count("SE209ZZ"), None);
        assert_eq!(counts.outcode_count("SE20"), Some(3));
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_count_for_prefers_postcode() {
        let records = vec![
            PlanningRecord::new("SE20 7UA", "2024-01-15"),
            PlanningRecord::new("SE20 8AB", "2024-01-15"),
        ];
        let counts = ActivityCounts::aggregate(&records, as_of());

        assert_eq!(counts.count_for("SE207UA", "SE20"), 1);
        assert_eq!(counts.count_for("SE201XX", "SE20"), 2);
        assert_eq!(counts.count_for("BR13PQ", "BR1"), 0);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let counts = ActivityCounts::aggregate(&[], as_of());
        assert!(counts.is_empty());
        assert_eq!(counts.count_for("SE207UA", "SE20"), 0);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let counts = ActivityCounts::load(Path::new("/no/such/planning.json"), as_of()).unwrap();
        assert!(counts.is_empty());
    }
}
