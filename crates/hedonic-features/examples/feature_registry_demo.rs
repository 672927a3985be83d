//! Lists the feature registry and encodes a couple of records.

use chrono::NaiveDate;
use hedonic_dataset::{PropertyType, Tenure, TrainingRecord};
use hedonic_features::{FeatureKind, FeatureSchema, available_features, features_by_kind};

fn main() {
    println!("Available features:");
    for feature in available_features() {
        println!("  {:<18} {:<14} {}", feature.name, format!("{:?}", feature.kind), feature.description);
    }
    println!(
        "\n{} numeric features are standardized\n",
        features_by_kind(FeatureKind::Numeric).len()
    );

    let records = vec![
        record("SE20", 0.8, PropertyType::Terraced, Tenure::Freehold),
        record("BR3", 2.4, PropertyType::Flat, Tenure::Leasehold),
        record("SE26", 1.9, PropertyType::SemiDetached, Tenure::Freehold),
    ];
    let schema = match FeatureSchema::fit(&records) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    for record in &records {
        let vector = schema.encode(record);
        println!("{} ({})", record.id, record.outcode);
        for (name, value) in schema.feature_names.iter().zip(vector.iter()) {
            println!("  {name:<18} {value:>8.4}");
        }
    }
}

fn record(outcode: &str, distance_km: f64, property_type: PropertyType, tenure: Tenure) -> TrainingRecord {
    let price = 350_000.0;
    TrainingRecord {
        id: format!("{outcode}-demo"),
        price,
        log_price: f64::ln(price),
        date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap_or_default(),
        year: 2023,
        month: 4,
        postcode: format!("{outcode}1AA"),
        outcode: outcode.to_string(),
        property_type,
        new_build: false,
        tenure,
        district: "BROMLEY".to_string(),
        distance_km,
        hpi_index: 148.0,
        planning_count_12m: 2,
    }
}
