//! Index aligner.
//!
//! Holds one monthly house price index series per region slug and answers
//! `(slug, YYYY-MM)` lookups with a bounded backward walk over missing months.

use crate::error::Result;
use crate::regions::{DEFAULT_REGION_SLUG, UkRegion};
use hedonic_data::dates::{format_month_key, parse_month_key, previous_month};
use hedonic_data::{HpiObservation, discover_hpi_files, read_hpi_file};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How many earlier months a lookup may fall back through.
pub const MAX_FALLBACK_MONTHS: usize = 24;

/// Most recent reading of one region's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    /// `YYYY-MM` key of the reading
    pub date_key: String,
    /// Index value
    pub value: f64,
}

/// Monthly index values keyed by lowercase region slug, then `YYYY-MM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalIndexSeries {
    series: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RegionalIndexSeries {
    /// Create an empty set of series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build series from per-region observations.
    ///
    /// A later observation for the same slug and month replaces an earlier one.
    pub fn build<I, O>(files: I) -> Self
    where
        I: IntoIterator<Item = (String, O)>,
        O: IntoIterator<Item = HpiObservation>,
    {
        let mut series = Self::new();
        for (slug, observations) in files {
            for obs in observations {
                series.insert(&slug, obs.date_key, obs.value);
            }
        }
        series
    }

    /// Discover and read every region file in `dir`.
    ///
    /// # Errors
    ///
    /// Fails if the directory is missing or any discovered file lacks a date
    /// or index column.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let slugs = UkRegion::slugs();
        let mut files = Vec::new();
        for file in discover_hpi_files(dir, &slugs)? {
            let observations = read_hpi_file(&file.path)?;
            info!(
                "Loaded {} index readings for {} from {}",
                observations.len(),
                file.slug,
                file.path.display()
            );
            files.push((file.slug, observations));
        }

        let series = Self::build(files);
        for (slug, latest) in series.latest() {
            info!("Latest {slug} index: {} ({})", latest.value, latest.date_key);
        }
        Ok(series)
    }

    /// Record a single reading.
    pub fn insert(&mut self, slug: &str, date_key: impl Into<String>, value: f64) {
        self.series
            .entry(slug.to_lowercase())
            .or_default()
            .insert(date_key.into(), value);
    }

    /// Resolve the index for `slug` at `date_key`.
    ///
    /// Tries the exact month first, then up to [`MAX_FALLBACK_MONTHS`]
    /// earlier months. An unknown slug is looked up in the London series.
    pub fn lookup(&self, slug: &str, date_key: &str) -> Option<f64> {
        let series = self
            .series
            .get(&slug.to_lowercase())
            .or_else(|| self.series.get(DEFAULT_REGION_SLUG))?;

        if let Some(value) = series.get(date_key) {
            return Some(*value);
        }

        let (mut year, mut month) = parse_month_key(date_key)?;
        for _ in 0..MAX_FALLBACK_MONTHS {
            (year, month) = previous_month(year, month);
            if let Some(value) = series.get(&format_month_key(year, month)) {
                return Some(*value);
            }
        }
        None
    }

    /// The latest reading per region.
    pub fn latest(&self) -> BTreeMap<String, LatestReading> {
        self.series
            .iter()
            .filter_map(|(slug, readings)| {
                readings.iter().next_back().map(|(key, value)| {
                    (
                        slug.clone(),
                        LatestReading {
                            date_key: key.clone(),
                            value: *value,
                        },
                    )
                })
            })
            .collect()
    }

    /// Readings for one region, if loaded.
    pub fn series(&self, slug: &str) -> Option<&BTreeMap<String, f64>> {
        self.series.get(&slug.to_lowercase())
    }

    /// Slugs with at least one reading.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of regions loaded.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no series has been loaded.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn obs(key: &str, value: f64) -> HpiObservation {
        HpiObservation {
            date_key: key.to_string(),
            value,
        }
    }

    fn sample() -> RegionalIndexSeries {
        RegionalIndexSeries::build(vec![
            (
                "london".to_string(),
                vec![obs("2022-11", 140.0), obs("2023-01", 150.0), obs("2023-02", 151.0)],
            ),
            ("south-east".to_string(), vec![obs("2020-06", 120.0)]),
        ])
    }

    #[rstest]
    #[case("london", "2023-01", Some(150.0))]
    #[case("london", "2023-06", Some(151.0))]
    #[case("london", "2022-12", Some(140.0))]
    #[case("london", "2022-10", None)]
    #[case("LONDON", "2023-02", Some(151.0))]
    #[case("south-east", "2022-06", Some(120.0))]
    #[case("south-east", "2022-07", None)]
    #[case("wales", "2023-02", Some(151.0))]
    #[case("london", "not-a-key", None)]
    fn test_lookup(#[case] slug: &str, #[case] key: &str, #[case] expected: Option<f64>) {
        assert_eq!(sample().lookup(slug, key), expected);
    }

    #[test]
    fn test_fallback_wraps_year() {
        let series = RegionalIndexSeries::build(vec![("london".to_string(), vec![obs("2022-12", 99.5)])]);
        assert_eq!(series.lookup("london", "2023-01"), Some(99.5));
    }

    #[test]
    fn test_unknown_slug_without_london() {
        let series = RegionalIndexSeries::build(vec![("wales".to_string(), vec![obs("2023-01", 1.0)])]);
        assert_eq!(series.lookup("scotland", "2023-01"), None);
    }

    #[test]
    fn test_latest() {
        let latest = sample().latest();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["london"].date_key, "2023-02");
        assert_eq!(latest["london"].value, 151.0);
        assert_eq!(latest["south-east"].date_key, "2020-06");
    }

    #[test]
    fn test_later_reading_replaces_earlier() {
        let mut series = sample();
        series.insert("London", "2023-01", 155.0);
        assert_eq!(series.lookup("london", "2023-01"), Some(155.0));
        assert_eq!(series.len(), 2);
    }
}
