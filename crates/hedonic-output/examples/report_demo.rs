//! Render a run report and export assembly statistics
//!
//! Builds a report from hand-written counters so the layout can be checked
//! without any source data.

use hedonic_dataset::{DatasetStats, GeocodeSummary, LatestReading};
use hedonic_output::{ExportFormat, Exporter, RunReport};
use std::collections::BTreeMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stats = DatasetStats {
        scanned: 48_210,
        included: 3_942,
        skipped_status: 611,
        skipped_missing: 87,
        skipped_bad_date: 3,
        skipped_outside: 43_567,
        missing_hpi: 41,
        ..DatasetStats::default()
    };
    let geocode = GeocodeSummary {
        total_scanned: 2_650_000,
        total_included: 4_118,
        terminated: 812_400,
        invalid_coordinates: 25_311,
        outside_area: 1_790_000,
        outside_radius: 18_171,
    };
    let latest = BTreeMap::from([
        (
            "london".to_string(),
            LatestReading {
                date_key: "2024-03".to_string(),
                value: 151.8,
            },
        ),
        (
            "south-east".to_string(),
            LatestReading {
                date_key: "2024-03".to_string(),
                value: 146.2,
            },
        ),
    ]);

    let report = RunReport::new("penge")
        .with_geocode(geocode)
        .with_stats(stats)
        .with_latest_hpi(latest);

    println!("{}", report.to_ascii_table());
    println!("{}", report.to_markdown());

    println!("Statistics as CSV:");
    println!("{}", stats.export_to_string(ExportFormat::Csv)?);
    Ok(())
}
