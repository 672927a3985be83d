//! Price-space evaluation metrics.

use hedonic_dataset::TrainingRecord;
use serde::{Deserialize, Serialize};

/// Error metrics, computed on prices rather than log prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error, as a fraction
    pub mape: f64,
    /// Coefficient of determination
    pub r2: f64,
}

/// Train and test metrics of a fitted model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// In-sample metrics
    pub train: Metrics,
    /// Held-out metrics
    pub test: Metrics,
}

/// Evaluate `predict_log_price` over `records`.
///
/// Predictions are exponentiated before comparison with the actual price.
/// An empty record set yields all-zero metrics.
pub fn evaluate<F>(records: &[TrainingRecord], predict_log_price: F) -> Metrics
where
    F: Fn(&TrainingRecord) -> f64,
{
    if records.is_empty() {
        return Metrics::default();
    }

    let n = records.len() as f64;
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (predict_log_price(r).exp(), r.price))
        .collect();

    let mae = pairs.iter().map(|(p, a)| (p - a).abs()).sum::<f64>() / n;
    let ss_res: f64 = pairs.iter().map(|(p, a)| (p - a).powi(2)).sum();
    let rmse = (ss_res / n).sqrt();

    let (ape_sum, ape_count) = pairs
        .iter()
        .filter(|(_, a)| *a > 0.0)
        .fold((0.0, 0usize), |(sum, count), (p, a)| (sum + (p - a).abs() / a, count + 1));
    let mape = if ape_count == 0 { 0.0 } else { ape_sum / ape_count as f64 };

    // Exact comparison; the mean of identical prices need not equal them
    let first = pairs[0].1;
    let r2 = if pairs.iter().all(|(_, a)| *a == first) {
        0.0
    } else {
        let mean = pairs.iter().map(|(_, a)| a).sum::<f64>() / n;
        let ss_tot: f64 = pairs.iter().map(|(_, a)| (a - mean).powi(2)).sum();
        1.0 - ss_res / ss_tot
    };

    Metrics { mae, rmse, mape, r2 }
}
