//! Dataset assembler.
//!
//! Streams raw price paid transactions through the geocode, index and
//! planning lookups. Each transaction either becomes one [`TrainingRecord`]
//! or increments exactly one rejection counter in [`DatasetStats`].

use crate::activity::ActivityCounts;
use crate::geocode::GeocodeLookup;
use crate::index::RegionalIndexSeries;
use crate::record::{DatasetStats, PropertyType, Tenure, TrainingRecord};
use crate::regions::UkRegion;
use chrono::Datelike;
use hedonic_data::RawTransaction;
use hedonic_data::dates::{month_key, parse_flexible_date};
use hedonic_data::postcode;
use log::{debug, info, warn};

/// Index value used when no regional reading can be resolved.
pub const DEFAULT_HPI_INDEX: f64 = 100.0;

/// Share of included records on [`DEFAULT_HPI_INDEX`] above which a warning is logged.
pub const MISSING_HPI_WARN_RATIO: f64 = 0.05;

/// Why a transaction was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Record status present and not `A`
    Status,
    /// No postcode, or a non-finite or non-positive price
    Missing,
    /// Transfer date could not be parsed
    BadDate,
    /// Postcode is not in the geocode lookup
    OutsideRegion,
}

/// The read-only lookups a run assembles against.
#[derive(Debug, Clone, Copy)]
pub struct Lookups<'a> {
    /// Postcodes inside the region
    pub geocode: &'a GeocodeLookup,
    /// Regional index series
    pub index: &'a RegionalIndexSeries,
    /// Planning activity counts
    pub activity: &'a ActivityCounts,
}

/// Validates and enriches transactions one at a time.
#[derive(Debug)]
pub struct DatasetAssembler<'a> {
    lookups: Lookups<'a>,
    stats: DatasetStats,
}

impl<'a> DatasetAssembler<'a> {
    /// Create an assembler over `lookups`.
    pub fn new(lookups: Lookups<'a>) -> Self {
        Self {
            lookups,
            stats: DatasetStats::default(),
        }
    }

    /// Validate and enrich one transaction, updating the statistics.
    pub fn process(&mut self, tx: &RawTransaction) -> Option<TrainingRecord> {
        self.stats.scanned += 1;
        match self.enrich(tx) {
            Ok(record) => {
                self.stats.included += 1;
                self.stats.observe_date(record.date);
                Some(record)
            }
            Err(rejection) => {
                debug!("{}: rejected ({rejection:?})", tx.id);
                match rejection {
                    Rejection::Status => self.stats.skipped_status += 1,
                    Rejection::Missing => self.stats.skipped_missing += 1,
                    Rejection::BadDate => self.stats.skipped_bad_date += 1,
                    Rejection::OutsideRegion => self.stats.skipped_outside += 1,
                }
                None
            }
        }
    }

    fn enrich(&mut self, tx: &RawTransaction) -> Result<TrainingRecord, Rejection> {
        if tx.record_status.as_deref().is_some_and(|status| status != "A") {
            return Err(Rejection::Status);
        }

        let raw_postcode = tx
            .postcode
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(Rejection::Missing)?;
        if !tx.price.is_finite() || tx.price <= 0.0 {
            return Err(Rejection::Missing);
        }

        let date = parse_flexible_date(&tx.date).ok_or(Rejection::BadDate)?;

        let normalized = postcode::normalize(raw_postcode);
        let info = self
            .lookups
            .geocode
            .get(&normalized)
            .ok_or(Rejection::OutsideRegion)?;

        let slug = UkRegion::for_district(&tx.district).slug();
        let hpi_index = self
            .lookups
            .index
            .lookup(slug, &month_key(date))
            .unwrap_or_else(|| {
                self.stats.missing_hpi += 1;
                DEFAULT_HPI_INDEX
            });

        let planning_count_12m = self.lookups.activity.count_for(&normalized, &info.outcode);

        Ok(TrainingRecord {
            id: tx.id.clone(),
            price: tx.price,
            log_price: tx.price.ln(),
            date,
            year: date.year(),
            month: date.month(),
            outcode: info.outcode.clone(),
            postcode: normalized,
            property_type: PropertyType::from_flag(&tx.property_type),
            new_build: tx.new_build.trim() == "Y",
            tenure: Tenure::from_flag(&tx.tenure),
            district: tx.district.clone(),
            distance_km: info.distance_km,
            hpi_index,
            planning_count_12m,
        })
    }

    /// Statistics so far.
    pub const fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    /// Consume the assembler, returning its statistics.
    pub const fn into_stats(self) -> DatasetStats {
        self.stats
    }

    /// Wrap a transaction stream, yielding only the assembled records.
    pub fn assemble<I>(self, transactions: I) -> Assembled<'a, I::IntoIter>
    where
        I: IntoIterator<Item = RawTransaction>,
    {
        Assembled {
            assembler: self,
            transactions: transactions.into_iter(),
        }
    }
}

/// Streaming iterator returned by [`DatasetAssembler::assemble`].
#[derive(Debug)]
pub struct Assembled<'a, I> {
    assembler: DatasetAssembler<'a>,
    transactions: I,
}

impl<I> Assembled<'_, I> {
    /// Statistics so far.
    pub const fn stats(&self) -> &DatasetStats {
        self.assembler.stats()
    }

    /// Stop iterating and return the statistics.
    pub fn into_stats(self) -> DatasetStats {
        self.assembler.into_stats()
    }
}

impl<I> Iterator for Assembled<'_, I>
where
    I: Iterator<Item = RawTransaction>,
{
    type Item = TrainingRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.transactions
            .by_ref()
            .find_map(|tx| self.assembler.process(&tx))
    }
}

/// Log the end-of-assembly summary for `stats`.
pub fn log_summary(stats: &DatasetStats) {
    info!(
        "Assembled {} of {} transactions (status {}, missing {}, bad date {}, outside {})",
        stats.included,
        stats.scanned,
        stats.skipped_status,
        stats.skipped_missing,
        stats.skipped_bad_date,
        stats.skipped_outside
    );
    if let (Some(min), Some(max)) = (stats.min_date, stats.max_date) {
        info!("Transfer dates span {min} to {max}");
    }
    if stats.missing_hpi_ratio() > MISSING_HPI_WARN_RATIO {
        warn!(
            "{} of {} records ({:.1}%) use the default index of {DEFAULT_HPI_INDEX}",
            stats.missing_hpi,
            stats.included,
            stats.missing_hpi_ratio() * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{GeoPoint, RegionConfig, resolve};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use hedonic_data::{HpiObservation, PlanningRecord, PostcodeRecord};

    struct Fixture {
        geocode: GeocodeLookup,
        index: RegionalIndexSeries,
        activity: ActivityCounts,
    }

    impl Fixture {
        fn new() -> Self {
            let region = RegionConfig {
                name: "test".to_string(),
                center: GeoPoint::new(51.4123, -0.0561),
                radius_km: 5.0,
                allowed_postcode_areas: vec!["SE".to_string()],
            };
            let geocode = resolve(
                vec![
                    PostcodeRecord::new("SE20 7UA", 51.4120, -0.0560, false),
                    PostcodeRecord::new("SE20 8AB", 51.4130, -0.0550, false),
                ],
                &region,
            )
            .lookup;
            let index = RegionalIndexSeries::build(vec![(
                "london".to_string(),
                vec![HpiObservation {
                    date_key: "2023-04".to_string(),
                    value: 142.5,
                }],
            )]);
            let activity = ActivityCounts::aggregate(
                &[PlanningRecord::new("SE20 9ZZ", "2023-01-10")],
                NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            );
            Self {
                geocode,
                index,
                activity,
            }
        }

        fn lookups(&self) -> Lookups<'_> {
            Lookups {
                geocode: &self.geocode,
                index: &self.index,
                activity: &self.activity,
            }
        }
    }

    fn tx(id: &str, price: f64, date: &str, postcode: Option<&str>, status: Option<&str>) -> RawTransaction {
        RawTransaction {
            id: id.to_string(),
            price,
            date: date.to_string(),
            postcode: postcode.map(String::from),
            property_type: "F".to_string(),
            new_build: "Y".to_string(),
            tenure: "L".to_string(),
            district: "Bromley".to_string(),
            record_status: status.map(String::from),
        }
    }

    #[test]
    fn test_enriches_valid_transaction() {
        let fixture = Fixture::new();
        let mut assembler = DatasetAssembler::new(fixture.lookups());

        let record = assembler
            .process(&tx("T1", 250_000.0, "2023-05-12 00:00", Some("se20 7ua"), Some("A")))
            .unwrap();
        assert_eq!(record.postcode, "SE207UA");
        assert_eq!(record.outcode, "SE20");
        assert_abs_diff_eq!(record.log_price, 250_000f64.ln());
        assert_eq!((record.year, record.month), (2023, 5));
        assert_eq!(record.hpi_index, 142.5);
        assert_eq!(record.planning_count_12m, 1);
        assert_eq!(record.property_type, PropertyType::Flat);
        assert!(record.new_build);
        assert_eq!(record.tenure, Tenure::Leasehold);
        assert_eq!(assembler.stats().missing_hpi, 0);
    }

    #[test]
    fn test_each_rejection_has_its_own_counter() {
        let fixture = Fixture::new();
        let transactions = vec![
            tx("ok", 300_000.0, "01/05/2023", Some("SE20 8AB"), None),
            tx("status", 300_000.0, "2023-05-01", Some("SE20 7UA"), Some("D")),
            tx("no-postcode", 300_000.0, "2023-05-01", None, Some("A")),
            tx("zero", 0.0, "2023-05-01", Some("SE20 7UA"), Some("A")),
            tx("nan", f64::NAN, "2023-05-01", Some("SE20 7UA"), Some("A")),
            tx("date", 300_000.0, "soon", Some("SE20 7UA"), Some("A")),
            tx("outside", 300_000.0, "2023-05-01", Some("BR1 3PQ"), Some("A")),
        ];

        let mut assembled = DatasetAssembler::new(fixture.lookups()).assemble(transactions);
        let records: Vec<_> = assembled.by_ref().collect();
        let stats = assembled.into_stats();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
        assert_eq!(stats.scanned, 7);
        assert_eq!(stats.included, 1);
        assert_eq!(stats.skipped_status, 1);
        assert_eq!(stats.skipped_missing, 3);
        assert_eq!(stats.skipped_bad_date, 1);
        assert_eq!(stats.skipped_outside, 1);
        assert_eq!(stats.skipped() + stats.included, stats.scanned);
    }

    #[test]
    fn test_blank_postcode_counts_as_missing() {
        let fixture = Fixture::new();
        let mut assembler = DatasetAssembler::new(fixture.lookups());

        assert!(assembler.process(&tx("blank", 300_000.0, "2023-05-01", Some("   "), Some("A"))).is_none());
        assert!(assembler.process(&tx("empty", 300_000.0, "2023-05-01", Some(""), Some("A"))).is_none());
        assert_eq!(assembler.stats().skipped_missing, 2);
        assert_eq!(assembler.stats().skipped_outside, 0);
    }

    #[test]
    fn test_missing_index_is_not_a_rejection() {
        let fixture = Fixture::new();
        let mut assembler = DatasetAssembler::new(fixture.lookups());

        let record = assembler
            .process(&tx("old", 200_000.0, "2019-01-01", Some("SE20 7UA"), Some("A")))
            .unwrap();
        assert_eq!(record.hpi_index, DEFAULT_HPI_INDEX);

        let stats = assembler.into_stats();
        assert_eq!(stats.included, 1);
        assert_eq!(stats.missing_hpi, 1);
        assert_eq!(stats.min_date, NaiveDate::from_ymd_opt(2019, 1, 1));
    }
}
