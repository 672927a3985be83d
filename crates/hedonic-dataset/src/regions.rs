//! UK house price index regions and the district lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Regions published in the UK house price index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UkRegion {
    /// London
    London,

    /// South East
    SouthEast,

    /// South West
    SouthWest,

    /// East of England
    EastOfEngland,

    /// East Midlands
    EastMidlands,

    /// West Midlands
    WestMidlands,

    /// North East
    NorthEast,

    /// North West
    NorthWest,

    /// Yorkshire and the Humber
    YorkshireAndTheHumber,

    /// Wales
    Wales,

    /// Scotland
    Scotland,

    /// Northern Ireland
    NorthernIreland,
}

/// Slug substituted for districts and series that cannot be resolved.
pub const DEFAULT_REGION_SLUG: &str = "london";

impl UkRegion {
    /// Returns all regions.
    pub fn all() -> Vec<Self> {
        vec![
            Self::London,
            Self::SouthEast,
            Self::SouthWest,
            Self::EastOfEngland,
            Self::EastMidlands,
            Self::WestMidlands,
            Self::NorthEast,
            Self::NorthWest,
            Self::YorkshireAndTheHumber,
            Self::Wales,
            Self::Scotland,
            Self::NorthernIreland,
        ]
    }

    /// Returns the lowercase slug used in index file names and series keys.
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::London => "london",
            Self::SouthEast => "south-east",
            Self::SouthWest => "south-west",
            Self::EastOfEngland => "east-of-england",
            Self::EastMidlands => "east-midlands",
            Self::WestMidlands => "west-midlands",
            Self::NorthEast => "north-east",
            Self::NorthWest => "north-west",
            Self::YorkshireAndTheHumber => "yorkshire-and-the-humber",
            Self::Wales => "wales",
            Self::Scotland => "scotland",
            Self::NorthernIreland => "northern-ireland",
        }
    }

    /// Returns the full region name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::London => "London",
            Self::SouthEast => "South East",
            Self::SouthWest => "South West",
            Self::EastOfEngland => "East of England",
            Self::EastMidlands => "East Midlands",
            Self::WestMidlands => "West Midlands",
            Self::NorthEast => "North East",
            Self::NorthWest => "North West",
            Self::YorkshireAndTheHumber => "Yorkshire and the Humber",
            Self::Wales => "Wales",
            Self::Scotland => "Scotland",
            Self::NorthernIreland => "Northern Ireland",
        }
    }

    /// Parse a region from its slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::all()
            .into_iter()
            .find(|region| region.slug().eq_ignore_ascii_case(slug))
    }

    /// Slugs of every region, in [`UkRegion::all`] order.
    pub fn slugs() -> Vec<&'static str> {
        Self::all().iter().map(Self::slug).collect()
    }

    /// Resolve the index region for a local authority district name.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Districts missing from the table resolve to [`UkRegion::London`].
    pub fn for_district(district: &str) -> Self {
        let district = district.trim();
        DISTRICT_REGIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(district))
            .map_or(Self::London, |(_, region)| *region)
    }
}

impl fmt::Display for UkRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// District -> region table, as district names appear in price-paid data.
pub const DISTRICT_REGIONS: &[(&str, UkRegion)] = &[
    // London boroughs
    ("BARKING AND DAGENHAM", UkRegion::London),
    ("BARNET", UkRegion::London),
    ("BEXLEY", UkRegion::London),
    ("BRENT", UkRegion::London),
    ("BROMLEY", UkRegion::London),
    ("CAMDEN", UkRegion::London),
    ("CITY OF LONDON", UkRegion::London),
    ("CITY OF WESTMINSTER", UkRegion::London),
    ("CROYDON", UkRegion::London),
    ("EALING", UkRegion::London),
    ("ENFIELD", UkRegion::London),
    ("GREENWICH", UkRegion::London),
    ("HACKNEY", UkRegion::London),
    ("HAMMERSMITH AND FULHAM", UkRegion::London),
    ("HARINGEY", UkRegion::London),
    ("HARROW", UkRegion::London),
    ("HAVERING", UkRegion::London),
    ("HILLINGDON", UkRegion::London),
    ("HOUNSLOW", UkRegion::London),
    ("ISLINGTON", UkRegion::London),
    ("KENSINGTON AND CHELSEA", UkRegion::London),
    ("KINGSTON UPON THAMES", UkRegion::London),
    ("LAMBETH", UkRegion::London),
    ("LEWISHAM", UkRegion::London),
    ("MERTON", UkRegion::London),
    ("NEWHAM", UkRegion::London),
    ("REDBRIDGE", UkRegion::London),
    ("RICHMOND UPON THAMES", UkRegion::London),
    ("SOUTHWARK", UkRegion::London),
    ("SUTTON", UkRegion::London),
    ("TOWER HAMLETS", UkRegion::London),
    ("WALTHAM FOREST", UkRegion::London),
    ("WANDSWORTH", UkRegion::London),
    // Commuter belt: south east
    ("DARTFORD", UkRegion::SouthEast),
    ("SEVENOAKS", UkRegion::SouthEast),
    ("GRAVESHAM", UkRegion::SouthEast),
    ("MEDWAY", UkRegion::SouthEast),
    ("MAIDSTONE", UkRegion::SouthEast),
    ("TONBRIDGE AND MALLING", UkRegion::SouthEast),
    ("TUNBRIDGE WELLS", UkRegion::SouthEast),
    ("TANDRIDGE", UkRegion::SouthEast),
    ("REIGATE AND BANSTEAD", UkRegion::SouthEast),
    ("EPSOM AND EWELL", UkRegion::SouthEast),
    ("ELMBRIDGE", UkRegion::SouthEast),
    ("MOLE VALLEY", UkRegion::SouthEast),
    ("RUNNYMEDE", UkRegion::SouthEast),
    ("SPELTHORNE", UkRegion::SouthEast),
    ("WOKING", UkRegion::SouthEast),
    ("GUILDFORD", UkRegion::SouthEast),
    ("SLOUGH", UkRegion::SouthEast),
    ("WINDSOR AND MAIDENHEAD", UkRegion::SouthEast),
    ("BRIGHTON AND HOVE", UkRegion::SouthEast),
    ("READING", UkRegion::SouthEast),
    ("OXFORD", UkRegion::SouthEast),
    ("MILTON KEYNES", UkRegion::SouthEast),
    // Commuter belt: east of england
    ("THURROCK", UkRegion::EastOfEngland),
    ("EPPING FOREST", UkRegion::EastOfEngland),
    ("BRENTWOOD", UkRegion::EastOfEngland),
    ("BASILDON", UkRegion::EastOfEngland),
    ("CHELMSFORD", UkRegion::EastOfEngland),
    ("HARLOW", UkRegion::EastOfEngland),
    ("BROXBOURNE", UkRegion::EastOfEngland),
    ("HERTSMERE", UkRegion::EastOfEngland),
    ("THREE RIVERS", UkRegion::EastOfEngland),
    ("WATFORD", UkRegion::EastOfEngland),
    ("WELWYN HATFIELD", UkRegion::EastOfEngland),
    ("ST ALBANS", UkRegion::EastOfEngland),
    ("DACORUM", UkRegion::EastOfEngland),
    ("SOUTHEND-ON-SEA", UkRegion::EastOfEngland),
    ("LUTON", UkRegion::EastOfEngland),
    ("CAMBRIDGE", UkRegion::EastOfEngland),
    // Major cities elsewhere
    ("CITY OF BRISTOL", UkRegion::SouthWest),
    ("BIRMINGHAM", UkRegion::WestMidlands),
    ("NOTTINGHAM", UkRegion::EastMidlands),
    ("LEICESTER", UkRegion::EastMidlands),
    ("MANCHESTER", UkRegion::NorthWest),
    ("LIVERPOOL", UkRegion::NorthWest),
    ("LEEDS", UkRegion::YorkshireAndTheHumber),
    ("SHEFFIELD", UkRegion::YorkshireAndTheHumber),
    ("NEWCASTLE UPON TYNE", UkRegion::NorthEast),
    ("CARDIFF", UkRegion::Wales),
];
