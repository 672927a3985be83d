//! Assembled training records and assembly statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property type, as coded in price paid data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// Detached
    #[serde(rename = "D")]
    Detached,

    /// Semi-detached
    #[serde(rename = "S")]
    SemiDetached,

    /// Terraced
    #[serde(rename = "T")]
    Terraced,

    /// Flat or maisonette
    #[serde(rename = "F")]
    Flat,

    /// Anything else
    #[serde(rename = "O")]
    Other,
}

impl PropertyType {
    /// Types with their own indicator feature; [`PropertyType::Other`] is the reference level.
    pub const INDICATED: [Self; 4] = [Self::Detached, Self::SemiDetached, Self::Terraced, Self::Flat];

    /// Coerce a raw flag; anything other than `D`, `S`, `T` or `F` is [`PropertyType::Other`].
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim() {
            "D" => Self::Detached,
            "S" => Self::SemiDetached,
            "T" => Self::Terraced,
            "F" => Self::Flat,
            _ => Self::Other,
        }
    }

    /// Single-letter code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Detached => "D",
            Self::SemiDetached => "S",
            Self::Terraced => "T",
            Self::Flat => "F",
            Self::Other => "O",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tenure of the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenure {
    /// Freehold
    #[serde(rename = "F")]
    Freehold,

    /// Leasehold
    #[serde(rename = "L")]
    Leasehold,
}

impl Tenure {
    /// `L` is leasehold; every other flag is treated as freehold.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim() == "L" {
            Self::Leasehold
        } else {
            Self::Freehold
        }
    }

    /// Single-letter code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Freehold => "F",
            Self::Leasehold => "L",
        }
    }
}

/// One validated, enriched transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    /// Transaction identifier
    pub id: String,
    /// Sale price, always positive
    pub price: f64,
    /// Natural log of `price`
    pub log_price: f64,
    /// Transfer date
    pub date: NaiveDate,
    /// Transfer year
    pub year: i32,
    /// Transfer month (1-12)
    pub month: u32,
    /// Normalized postcode
    pub postcode: String,
    /// Outward code
    pub outcode: String,
    /// Property type
    pub property_type: PropertyType,
    /// Newly built property
    pub new_build: bool,
    /// Tenure
    pub tenure: Tenure,
    /// Local authority district as published
    pub district: String,
    /// Distance from the region centre
    pub distance_km: f64,
    /// Regional index at the transfer month, or the neutral default
    pub hpi_index: f64,
    /// Planning applications in the trailing window
    #[serde(rename = "planningCount12m")]
    pub planning_count_12m: u32,
}

/// Counters accumulated while assembling the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    /// Transactions examined
    pub scanned: u64,
    /// Records emitted
    pub included: u64,
    /// Rejected for a record status other than `A`
    pub skipped_status: u64,
    /// Rejected for a missing postcode or an invalid price
    pub skipped_missing: u64,
    /// Rejected for an unparsable date
    pub skipped_bad_date: u64,
    /// Rejected because the postcode is outside the region
    pub skipped_outside: u64,
    /// Included with the neutral index default
    pub missing_hpi: u64,
    /// Earliest included transfer date
    pub min_date: Option<NaiveDate>,
    /// Latest included transfer date
    pub max_date: Option<NaiveDate>,
}

impl DatasetStats {
    /// Extend the observed date range with `date`.
    pub fn observe_date(&mut self, date: NaiveDate) {
        self.min_date = Some(self.min_date.map_or(date, |d| d.min(date)));
        self.max_date = Some(self.max_date.map_or(date, |d| d.max(date)));
    }

    /// Fold another file's statistics into these.
    pub fn merge(&mut self, other: &Self) {
        self.scanned += other.scanned;
        self.included += other.included;
        self.skipped_status += other.skipped_status;
        self.skipped_missing += other.skipped_missing;
        self.skipped_bad_date += other.skipped_bad_date;
        self.skipped_outside += other.skipped_outside;
        self.missing_hpi += other.missing_hpi;
        if let Some(date) = other.min_date {
            self.observe_date(date);
        }
        if let Some(date) = other.max_date {
            self.observe_date(date);
        }
    }

    /// Total rejected transactions.
    pub const fn skipped(&self) -> u64 {
        self.skipped_status + self.skipped_missing + self.skipped_bad_date + self.skipped_outside
    }

    /// Share of included records that fell back to the neutral index.
    pub fn missing_hpi_ratio(&self) -> f64 {
        if self.included == 0 {
            0.0
        } else {
            self.missing_hpi as f64 / self.included as f64
        }
    }
}
