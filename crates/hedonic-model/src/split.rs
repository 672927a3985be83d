//! Train/test splitting.

use hedonic_data::dates::month_index;
use hedonic_dataset::TrainingRecord;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum records each side of a temporal split must hold.
pub const MIN_PARTITION_SIZE: usize = 10;

/// Months held out at the end of the data by a temporal split.
pub const HOLDOUT_MONTHS: i32 = 12;

/// How records are partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Last [`HOLDOUT_MONTHS`] months become the test set
    #[default]
    Temporal,
    /// Seeded pseudo-random assignment
    Random,
}

impl SplitMode {
    /// Lowercase name, as used in configuration files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temporal" => Ok(Self::Temporal),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown split mode '{other}' (expected temporal or random)")),
        }
    }
}

/// Linear congruential generator: `s = s * 1664525 + 1013904223 mod 2^32`.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seed the generator. Only the low 32 bits of `seed` matter.
    pub const fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    /// Advance and return a value in `[0, 1)`.
    pub const fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state as f64 / 4_294_967_296.0
    }
}

/// A train/test partition.
#[derive(Debug, Clone)]
pub struct Split {
    /// Records to fit on
    pub train: Vec<TrainingRecord>,
    /// Records held out for evaluation
    pub test: Vec<TrainingRecord>,
    /// The mode actually applied
    pub mode_used: SplitMode,
}

/// Partition `records`.
///
/// A temporal split is only used when it leaves at least
/// [`MIN_PARTITION_SIZE`] records on both sides; otherwise the records are
/// split randomly with `test_ratio` and `seed`, in their original order.
pub fn split(records: Vec<TrainingRecord>, mode: SplitMode, test_ratio: f64, seed: u64) -> Split {
    let result = match mode {
        SplitMode::Temporal => match temporal_cutoff(&records, MIN_PARTITION_SIZE) {
            Some(cutoff) => split_temporal(records, cutoff),
            None => {
                warn!(
                    "Temporal split would leave fewer than {MIN_PARTITION_SIZE} records on one side; using random split"
                );
                split_random(records, test_ratio, seed)
            }
        },
        SplitMode::Random => split_random(records, test_ratio, seed),
    };
    info!(
        "Split {} train / {} test ({})",
        result.train.len(),
        result.test.len(),
        result.mode_used
    );
    result
}

fn record_month(record: &TrainingRecord) -> i32 {
    month_index(record.year, record.month)
}

/// Month index after which records are held out, if both sides are large enough.
fn temporal_cutoff(records: &[TrainingRecord], min_size: usize) -> Option<i32> {
    let latest = records.iter().map(record_month).max()?;
    let cutoff = latest - HOLDOUT_MONTHS;
    let test = records.iter().filter(|r| record_month(r) > cutoff).count();
    let train = records.len() - test;
    (train >= min_size && test >= min_size).then_some(cutoff)
}

fn split_temporal(mut records: Vec<TrainingRecord>, cutoff: i32) -> Split {
    records.sort_by_key(|r| (r.year, r.month));
    let boundary = records.partition_point(|r| record_month(r) <= cutoff);
    let test = records.split_off(boundary);
    Split {
        train: records,
        test,
        mode_used: SplitMode::Temporal,
    }
}

fn split_random(records: Vec<TrainingRecord>, test_ratio: f64, seed: u64) -> Split {
    let mut lcg = Lcg::new(seed);
    let (test, train): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|_| lcg.next_f64() < test_ratio);
    Split {
        train,
        test,
        mode_used: SplitMode::Random,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hedonic_dataset::{PropertyType, Tenure};
    use rstest::rstest;

    fn record(i: usize, year: i32, month: u32) -> TrainingRecord {
        TrainingRecord {
            id: format!("R{i}"),
            price: 100_000.0,
            log_price: 100_000f64.ln(),
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            year,
            month,
            postcode: "SE207UA".to_string(),
            outcode: "SE20".to_string(),
            property_type: PropertyType::Terraced,
            new_build: false,
            tenure: Tenure::Freehold,
            district: "BROMLEY".to_string(),
            distance_km: 1.0,
            hpi_index: 100.0,
            planning_count_12m: 0,
        }
    }

    /// One record per month from January 2019, `n` months.
    fn monthly(n: usize) -> Vec<TrainingRecord> {
        (0..n)
            .map(|i| record(i, 2019 + (i / 12) as i32, 1 + (i % 12) as u32))
            .collect()
    }

    fn ids(records: &[TrainingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_lcg_recurrence() {
        let mut lcg = Lcg::new(0);
        assert_eq!(lcg.next_f64(), 1_013_904_223.0 / 4_294_967_296.0);
        let mut lcg = Lcg::new(1);
        assert_eq!(lcg.next_f64(), (1_664_525.0 + 1_013_904_223.0) / 4_294_967_296.0);
    }

    #[test]
    fn test_lcg_range() {
        let mut lcg = Lcg::new(42);
        for _ in 0..10_000 {
            let u = lcg.next_f64();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_temporal_split_holds_out_last_year() {
        // 36 months: 2019-01 .. 2021-12; test is 2021-01 .. 2021-12
        let mut records = monthly(36);
        records.reverse();
        let result = split(records, SplitMode::Temporal, 0.2, 1);

        assert_eq!(result.mode_used, SplitMode::Temporal);
        assert_eq!(result.train.len(), 24);
        assert_eq!(result.test.len(), 12);
        assert!(result.test.iter().all(|r| r.year == 2021));
        assert!(result.train.windows(2).all(|w| (w[0].year, w[0].month) <= (w[1].year, w[1].month)));
    }

    #[rstest]
    #[case(monthly(15))]
    #[case(monthly(21))]
    #[case((0..40).map(|i| record(i, 2022, 3)).collect())]
    #[case(Vec::new())]
    fn test_temporal_falls_back_to_random(#[case] records: Vec<TrainingRecord>) {
        let n = records.len();
        let result = split(records, SplitMode::Temporal, 0.2, 7);
        assert_eq!(result.mode_used, SplitMode::Random);
        assert_eq!(result.train.len() + result.test.len(), n);
    }

    #[test]
    fn test_temporal_minimum_boundary() {
        // 22 months: 10 train, 12 test
        let result = split(monthly(22), SplitMode::Temporal, 0.2, 7);
        assert_eq!(result.mode_used, SplitMode::Temporal);
        assert_eq!(result.train.len(), 10);
    }

    #[test]
    fn test_random_split_is_deterministic() {
        let a = split(monthly(200), SplitMode::Random, 0.25, 1234);
        let b = split(monthly(200), SplitMode::Random, 0.25, 1234);
        assert_eq!(ids(&a.test), ids(&b.test));
        assert_eq!(ids(&a.train), ids(&b.train));

        let c = split(monthly(200), SplitMode::Random, 0.25, 4321);
        assert_ne!(ids(&a.test), ids(&c.test));
    }

    #[test]
    fn test_random_split_ratio() {
        let result = split(monthly(2000), SplitMode::Random, 0.2, 99);
        let share = result.test.len() as f64 / 2000.0;
        assert!((share - 0.2).abs() < 0.05, "test share {share}");
    }

    #[rstest]
    #[case("temporal", SplitMode::Temporal)]
    #[case("Random", SplitMode::Random)]
    #[case(" random ", SplitMode::Random)]
    fn test_parse_mode(#[case] raw: &str, #[case] expected: SplitMode) {
        assert_eq!(raw.parse::<SplitMode>().unwrap(), expected);
    }

    #[test]
    fn test_parse_mode_rejects_unknown() {
        assert!("kfold".parse::<SplitMode>().is_err());
    }
}
