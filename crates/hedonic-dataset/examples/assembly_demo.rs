//! Demonstration of hedonic-dataset assembly on a handful of in-memory rows
//!
//! Shows:
//! - Geocode resolution against a region centre and radius
//! - Index lookups with the backward month walk
//! - Planning activity counts
//! - Dataset assembly and its rejection counters

use chrono::NaiveDate;
use hedonic_data::{HpiObservation, PlanningRecord, PostcodeRecord, RawTransaction};
use hedonic_dataset::{
    ActivityCounts, DatasetAssembler, GeoPoint, Lookups, RegionConfig, RegionalIndexSeries,
    UkRegion, resolve,
};

fn main() {
    println!("==========================================================");
    println!("          Hedonic Dataset Assembly - Demo");
    println!("==========================================================\n");

    let region = RegionConfig {
        name: "penge".to_string(),
        center: GeoPoint::new(51.4123, -0.0561),
        radius_km: 3.0,
        allowed_postcode_areas: vec!["SE".to_string(), "BR".to_string()],
    };

    let gazetteer = vec![
        PostcodeRecord::new("SE20 7UA", 51.4120, -0.0560, false),
        PostcodeRecord::new("SE20 8AB", 51.4150, -0.0490, false),
        PostcodeRecord::new("BR3 1AA", 51.4080, -0.0300, false),
        PostcodeRecord::new("SE1 9SG", 51.5045, -0.0865, false),
        PostcodeRecord::new("SE20 7ZZ", 51.4121, -0.0562, true),
    ];
    let geocode = resolve(gazetteer, &region);
    println!("Geocode: {:?}\n", geocode.summary);

    let index = RegionalIndexSeries::build(vec![(
        UkRegion::London.slug().to_string(),
        vec![
            HpiObservation {
                date_key: "2023-01".to_string(),
                value: 148.2,
            },
            HpiObservation {
                date_key: "2023-03".to_string(),
                value: 147.6,
            },
        ],
    )]);
    for key in ["2023-01", "2023-02", "2023-04", "2021-01"] {
        println!("london {key}: {:?}", index.lookup("london", key));
    }
    println!();

    let activity = ActivityCounts::aggregate(
        &[
            PlanningRecord::new("SE20 7UA", "2023-02-01"),
            PlanningRecord::new("SE20 8XY", "14/12/2022"),
        ],
        NaiveDate::from_ymd_opt(2023, 6, 30).unwrap_or_default(),
    );

    let transactions = vec![
        transaction("T1", 425_000.0, "2023-03-17", "SE20 7UA", "T"),
        transaction("T2", 310_000.0, "2023-04-02", "SE20 8AB", "F"),
        transaction("T3", 650_000.0, "2023-04-20", "SE1 9SG", "D"),
        transaction("T4", -1.0, "2023-04-20", "BR3 1AA", "S"),
    ];

    let lookups = Lookups {
        geocode: &geocode.lookup,
        index: &index,
        activity: &activity,
    };
    let mut assembled = DatasetAssembler::new(lookups).assemble(transactions);
    for record in assembled.by_ref() {
        println!(
            "{:<4} {:>9.0} {:<8} {:<2} {:>5.2} km  hpi {:>6.1}  planning {}",
            record.id,
            record.price,
            record.postcode,
            record.property_type,
            record.distance_km,
            record.hpi_index,
            record.planning_count_12m
        );
    }
    println!("\nStats: {:?}", assembled.into_stats());
}

fn transaction(id: &str, price: f64, date: &str, postcode: &str, property_type: &str) -> RawTransaction {
    RawTransaction {
        id: id.to_string(),
        price,
        date: date.to_string(),
        postcode: Some(postcode.to_string()),
        property_type: property_type.to_string(),
        new_build: "N".to_string(),
        tenure: "F".to_string(),
        district: "BROMLEY".to_string(),
        record_status: Some("A".to_string()),
    }
}
