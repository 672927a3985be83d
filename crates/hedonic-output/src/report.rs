//! Run report
//!
//! Collects what a build or training run produced and renders it for a
//! terminal or for documentation.

use hedonic_dataset::{DEFAULT_HPI_INDEX, DatasetStats, GeocodeSummary, LatestReading};
use hedonic_model::{FittedModel, Metrics};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of coefficients listed by default.
pub const DEFAULT_TOP_COEFFICIENTS: usize = 10;

const WIDTH: usize = 72;

/// Summary of a pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Region name
    pub region: String,
    /// Geocode resolver counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocode: Option<GeocodeSummary>,
    /// Dataset assembly counters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DatasetStats>,
    /// Latest reading per index region
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub latest_hpi: BTreeMap<String, LatestReading>,
    /// Trained model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<FittedModel>,
    /// Coefficients shown by the text renderings
    #[serde(skip)]
    pub top_n: usize,
}

impl RunReport {
    /// Create an empty report for `region`.
    ///
    /// # Example
    ///
    /// ```
    /// use hedonic_output::RunReport;
    ///
    /// let report = RunReport::new("penge");
    /// assert!(report.to_ascii_table().contains("penge"));
    /// ```
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            geocode: None,
            stats: None,
            latest_hpi: BTreeMap::new(),
            model: None,
            top_n: DEFAULT_TOP_COEFFICIENTS,
        }
    }

    /// Attach geocode counters.
    pub const fn with_geocode(mut self, summary: GeocodeSummary) -> Self {
        self.geocode = Some(summary);
        self
    }

    /// Attach assembly counters.
    pub const fn with_stats(mut self, stats: DatasetStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Attach latest index readings.
    pub fn with_latest_hpi(mut self, latest: BTreeMap<String, LatestReading>) -> Self {
        self.latest_hpi = latest;
        self
    }

    /// Attach a trained model.
    pub fn with_model(mut self, model: FittedModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Set how many coefficients the text renderings list.
    pub const fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Share of scanned transactions that were included.
    pub fn inclusion_ratio(&self) -> f64 {
        match self.stats {
            Some(s) if s.scanned > 0 => s.included as f64 / s.scanned as f64,
            _ => 0.0,
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nHedonic Run Report: {}\n", self.region));
        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        if let Some(g) = &self.geocode {
            section(&mut output, "Geocoding");
            row(&mut output, "Postcodes scanned", g.total_scanned);
            row(&mut output, "Postcodes included", g.total_included);
            row(&mut output, "Terminated", g.terminated);
            row(&mut output, "Invalid coordinates", g.invalid_coordinates);
            row(&mut output, "Outside postcode areas", g.outside_area);
            row(&mut output, "Outside radius", g.outside_radius);
        }

        if let Some(s) = &self.stats {
            section(&mut output, "Dataset Assembly");
            row(&mut output, "Transactions scanned", s.scanned);
            row(
                &mut output,
                "Records included",
                format!("{} ({:.1}%)", s.included, self.inclusion_ratio() * 100.0),
            );
            row(&mut output, "Skipped (status)", s.skipped_status);
            row(&mut output, "Skipped (missing fields)", s.skipped_missing);
            row(&mut output, "Skipped (bad date)", s.skipped_bad_date);
            row(&mut output, "Skipped (outside region)", s.skipped_outside);
            row(
                &mut output,
                &format!("Missing HPI (used {DEFAULT_HPI_INDEX})"),
                format!("{} ({:.1}%)", s.missing_hpi, s.missing_hpi_ratio() * 100.0),
            );
            row(&mut output, "Date range", date_range(s));
        }

        if !self.latest_hpi.is_empty() {
            section(&mut output, "Latest HPI Readings");
            output.push_str(&format!("  {:<28} {:>10} {:>12}\n", "Region", "Month", "Index"));
            for (slug, reading) in &self.latest_hpi {
                output.push_str(&format!(
                    "  {:<28} {:>10} {:>12.2}\n",
                    slug, reading.date_key, reading.value
                ));
            }
        }

        if let Some(model) = &self.model {
            section(&mut output, "Model");
            row(&mut output, "Lambda", model.lambda);
            row(&mut output, "Split mode", model.split_mode);
            row(&mut output, "Train records", model.train_size);
            row(&mut output, "Test records", model.test_size);
            row(&mut output, "Features", model.feature_schema.len());
            row(&mut output, "Intercept", format!("{:.4}", model.intercept()));

            output.push('\n');
            output.push_str(&format!(
                "  {:<10} {:>14} {:>14} {:>9} {:>8}\n",
                "Partition", "MAE", "RMSE", "MAPE", "R²"
            ));
            for (name, m) in [("train", &model.metrics.train), ("test", &model.metrics.test)] {
                output.push_str(&format!(
                    "  {:<10} {:>14.0} {:>14.0} {:>8.2}% {:>8.3}\n",
                    name,
                    m.mae,
                    m.rmse,
                    m.mape * 100.0,
                    m.r2
                ));
            }

            let top = model.top_coefficients(self.top_n);
            if !top.is_empty() {
                section(&mut output, "Top Coefficients");
                output.push_str(&format!("  {:<32} {:>12} {:>10}\n", "Feature", "Coefficient", "Effect"));
                for (name, coefficient) in top {
                    output.push_str(&format!(
                        "  {:<32} {:>12.4} {:>+9.1}%\n",
                        name,
                        coefficient,
                        price_effect(coefficient)
                    ));
                }
            }
        }

        output.push_str(&"=".repeat(WIDTH));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Hedonic Run Report: {}\n\n", self.region));

        if let Some(g) = &self.geocode {
            output.push_str("## Geocoding\n\n");
            output.push_str(&format!("- **Postcodes scanned:** {}\n", g.total_scanned));
            output.push_str(&format!("- **Postcodes included:** {}\n", g.total_included));
            output.push_str(&format!(
                "- **Rejected:** {} terminated, {} invalid coordinates, {} outside areas, {} outside radius\n\n",
                g.terminated, g.invalid_coordinates, g.outside_area, g.outside_radius
            ));
        }

        if let Some(s) = &self.stats {
            output.push_str("## Dataset Assembly\n\n");
            output.push_str("| Counter | Value |\n");
            output.push_str("|---------|-------|\n");
            output.push_str(&format!("| Transactions scanned | {} |\n", s.scanned));
            output.push_str(&format!(
                "| Records included | {} ({:.1}%) |\n",
                s.included,
                self.inclusion_ratio() * 100.0
            ));
            output.push_str(&format!("| Skipped (status) | {} |\n", s.skipped_status));
            output.push_str(&format!("| Skipped (missing fields) | {} |\n", s.skipped_missing));
            output.push_str(&format!("| Skipped (bad date) | {} |\n", s.skipped_bad_date));
            output.push_str(&format!("| Skipped (outside region) | {} |\n", s.skipped_outside));
            output.push_str(&format!(
                "| Missing HPI | {} ({:.1}%) |\n",
                s.missing_hpi,
                s.missing_hpi_ratio() * 100.0
            ));
            output.push_str(&format!("| Date range | {} |\n\n", date_range(s)));
        }

        if !self.latest_hpi.is_empty() {
            output.push_str("## Latest HPI Readings\n\n");
            output.push_str("| Region | Month | Index |\n");
            output.push_str("|--------|-------|-------|\n");
            for (slug, reading) in &self.latest_hpi {
                output.push_str(&format!(
                    "| {} | {} | {:.2} |\n",
                    slug, reading.date_key, reading.value
                ));
            }
            output.push('\n');
        }

        if let Some(model) = &self.model {
            output.push_str("## Model\n\n");
            output.push_str(&format!("- **Lambda:** {}\n", model.lambda));
            output.push_str(&format!("- **Split mode:** {}\n", model.split_mode));
            output.push_str(&format!(
                "- **Records:** {} train, {} test\n",
                model.train_size, model.test_size
            ));
            output.push_str(&format!("- **Features:** {}\n\n", model.feature_schema.len()));

            output.push_str("| Partition | MAE | RMSE | MAPE | R² |\n");
            output.push_str("|-----------|-----|------|------|----|\n");
            output.push_str(&metrics_row("train", &model.metrics.train));
            output.push_str(&metrics_row("test", &model.metrics.test));
            output.push('\n');

            let top = model.top_coefficients(self.top_n);
            if !top.is_empty() {
                output.push_str("## Top Coefficients\n\n");
                output.push_str("| Feature | Coefficient | Price Effect |\n");
                output.push_str("|---------|-------------|--------------|\n");
                for (name, coefficient) in top {
                    output.push_str(&format!(
                        "| {} | {:.4} | {:+.1}% |\n",
                        name,
                        coefficient,
                        price_effect(coefficient)
                    ));
                }
            }
        }

        output
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Report: {}", self.region)?;
        if let Some(s) = &self.stats {
            writeln!(f, "  Records: {} of {} included", s.included, s.scanned)?;
        }
        if let Some(model) = &self.model {
            writeln!(f, "  Split: {}", model.split_mode)?;
            writeln!(f, "  Test R²: {:.3}", model.metrics.test.r2)?;
            writeln!(f, "  Test MAPE: {:.2}%", model.metrics.test.mape * 100.0)?;
        }
        Ok(())
    }
}

fn section(output: &mut String, title: &str) {
    output.push_str(&format!("\n{title}:\n"));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');
}

fn row(output: &mut String, label: &str, value: impl fmt::Display) {
    output.push_str(&format!("  {:<30} {}\n", format!("{label}:"), value));
}

fn date_range(stats: &DatasetStats) -> String {
    match (stats.min_date, stats.max_date) {
        (Some(min), Some(max)) => format!("{min} to {max}"),
        _ => "n/a".to_string(),
    }
}

fn metrics_row(name: &str, m: &Metrics) -> String {
    format!(
        "| {} | {:.0} | {:.0} | {:.2}% | {:.3} |\n",
        name,
        m.mae,
        m.rmse,
        m.mape * 100.0,
        m.r2
    )
}

/// Percentage price change implied by a unit change in a log-price coefficient.
fn price_effect(coefficient: f64) -> f64 {
    (coefficient.exp() - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn stats() -> DatasetStats {
        let mut stats = DatasetStats {
            scanned: 200,
            included: 150,
            skipped_status: 10,
            skipped_missing: 5,
            skipped_bad_date: 5,
            skipped_outside: 30,
            missing_hpi: 15,
            ..DatasetStats::default()
        };
        stats.observe_date(NaiveDate::from_ymd_opt(2019, 2, 1).unwrap());
        stats.observe_date(NaiveDate::from_ymd_opt(2023, 11, 30).unwrap());
        stats
    }

    fn latest() -> BTreeMap<String, LatestReading> {
        BTreeMap::from([(
            "london".to_string(),
            LatestReading {
                date_key: "2024-03".to_string(),
                value: 152.37,
            },
        )])
    }

    #[test]
    fn test_inclusion_ratio() {
        assert_eq!(RunReport::new("x").inclusion_ratio(), 0.0);
        let report = RunReport::new("x").with_stats(stats());
        assert_abs_diff_eq!(report.inclusion_ratio(), 0.75);
        let empty = RunReport::new("x").with_stats(DatasetStats::default());
        assert_eq!(empty.inclusion_ratio(), 0.0);
    }

    #[test]
    fn test_ascii_table() {
        let report = RunReport::new("penge")
            .with_geocode(GeocodeSummary {
                total_scanned: 500,
                total_included: 120,
                ..GeocodeSummary::default()
            })
            .with_stats(stats())
            .with_latest_hpi(latest());
        let table = report.to_ascii_table();

        assert!(table.contains("Hedonic Run Report: penge"));
        assert!(table.contains("Postcodes included:"));
        assert!(table.contains("150 (75.0%)"));
        assert!(table.contains("15 (10.0%)"));
        assert!(table.contains("2019-02-01 to 2023-11-30"));
        assert!(table.contains("152.37"));
        assert!(!table.contains("Top Coefficients"));
    }

    #[test]
    fn test_markdown() {
        let report = RunReport::new("penge").with_stats(stats()).with_latest_hpi(latest());
        let md = report.to_markdown();
        assert!(md.starts_with("# Hedonic Run Report: penge"));
        assert!(md.contains("| Records included | 150 (75.0%) |"));
        assert!(md.contains("| london | 2024-03 | 152.37 |"));
    }

    #[test]
    fn test_json_omits_empty_sections() {
        let report = RunReport::new("penge").with_stats(stats());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["region"], "penge");
        assert_eq!(json["stats"]["included"], 150);
        assert!(json.get("model").is_none());
        assert!(json.get("latestHpi").is_none());
        assert!(json.get("topN").is_none());
    }

    #[test]
    fn test_price_effect() {
        assert_abs_diff_eq!(price_effect(0.0), 0.0);
        assert_abs_diff_eq!(price_effect(2f64.ln()), 100.0, epsilon = 1e-9);
    }
}
