//! Solver recovery and end-to-end training on synthetic data.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use hedonic_dataset::{PropertyType, Tenure, TrainingRecord};
use hedonic_model::{
    FittedModel, ModelError, ModelTrainer, RegressionSolver, RidgeSolver, SolverError, SplitMode,
    TrainingConfig,
};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_solver_recovers_known_coefficients() {
    let mut rng = StdRng::seed_from_u64(7);
    let truth = Array1::from(vec![3.5, -1.25, 0.8, 2.0, -0.4, 0.05]);
    let n = 200;
    let p = truth.len();

    let mut x = Array2::<f64>::zeros((n, p));
    for i in 0..n {
        x[[i, 0]] = 1.0;
        for j in 1..p {
            x[[i, j]] = rng.gen_range(-1.0..1.0);
        }
    }
    let y = x.dot(&truth);

    let beta = RidgeSolver::with_lambda(0.0).fit(&x, &y).unwrap();
    for (estimated, expected) in beta.iter().zip(truth.iter()) {
        assert_abs_diff_eq!(estimated, expected, epsilon = 1e-6);
    }
}

const OUTCODES: [&str; 3] = ["BR3", "SE20", "SE26"];
const TYPES: [PropertyType; 5] = [
    PropertyType::Detached,
    PropertyType::SemiDetached,
    PropertyType::Terraced,
    PropertyType::Flat,
    PropertyType::Other,
];

/// Records whose log price is an exact linear function of the features.
fn linear_records(n: usize, seed: u64) -> Vec<TrainingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let year = 2019 + (i % 60 / 12) as i32;
            let month = 1 + (i % 12) as u32;
            let distance_km: f64 = rng.gen_range(0.1..5.0);
            let hpi_index: f64 = rng.gen_range(90.0..160.0);
            let planning: u32 = rng.gen_range(0..6);
            let property_type = TYPES[rng.gen_range(0..TYPES.len())];
            let outcode = OUTCODES[rng.gen_range(0..OUTCODES.len())];
            let new_build = rng.gen_bool(0.1);
            let tenure = if rng.gen_bool(0.3) { Tenure::Leasehold } else { Tenure::Freehold };

            let log_price = 12.0 - 0.08 * distance_km + 0.004 * hpi_index + 0.01 * f64::from(planning)
                + 0.02 * f64::from(year - 2019)
                + match property_type {
                    PropertyType::Detached => 0.35,
                    PropertyType::SemiDetached => 0.15,
                    PropertyType::Flat => -0.2,
                    _ => 0.0,
                }
                + if new_build { 0.05 } else { 0.0 }
                + if tenure == Tenure::Leasehold { -0.03 } else { 0.0 }
                + if outcode == "SE26" { 0.07 } else { 0.0 };

            TrainingRecord {
                id: format!("S{i}"),
                price: log_price.exp(),
                log_price,
                date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
                year,
                month,
                postcode: format!("{outcode}{}AB", i % 10),
                outcode: outcode.to_string(),
                property_type,
                new_build,
                tenure,
                district: "BROMLEY".to_string(),
                distance_km,
                hpi_index,
                planning_count_12m: planning,
            }
        })
        .collect()
}

#[test]
fn test_train_fits_linear_data() {
    let config = TrainingConfig {
        lambda: 1e-8,
        ..TrainingConfig::default()
    };
    let model = ModelTrainer::new(config).train(linear_records(600, 11)).unwrap();

    assert_eq!(model.split_mode, SplitMode::Temporal);
    assert_eq!(model.train_size + model.test_size, 600);
    assert_eq!(model.coefficients.len(), model.feature_schema.feature_names.len());
    assert!(model.metrics.train.r2 > 0.999, "train r2 {}", model.metrics.train.r2);
    assert!(model.metrics.test.r2 > 0.99, "test r2 {}", model.metrics.test.r2);
    assert!(model.metrics.test.mape < 0.01);

    // Indicator effects come back on their own scale
    assert_abs_diff_eq!(model.coefficient("type_D").unwrap(), 0.35, epsilon = 1e-4);
    assert_abs_diff_eq!(model.coefficient("outcode_SE26").unwrap(), 0.07, epsilon = 1e-4);
    assert_abs_diff_eq!(model.coefficient("outcode_SE20").unwrap(), 0.0, epsilon = 1e-4);
}

#[test]
fn test_small_dataset_reports_random_split() {
    let config = TrainingConfig {
        lambda: 0.5,
        ..TrainingConfig::default()
    };
    let mut records = linear_records(30, 3);
    for r in &mut records {
        r.year = 2023;
        r.month = 6;
    }
    let model = ModelTrainer::new(config).train(records).unwrap();
    assert_eq!(model.split_mode, SplitMode::Random);
}

#[test]
fn test_singular_system_is_surfaced() {
    let config = TrainingConfig {
        lambda: 0.0,
        split_mode: SplitMode::Random,
        ..TrainingConfig::default()
    };
    let mut records = linear_records(50, 5);
    let template = records[0].clone();
    for (i, r) in records.iter_mut().enumerate() {
        let price = 200_000.0 + i as f64 * 1_000.0;
        *r = TrainingRecord {
            id: format!("C{i}"),
            price,
            log_price: price.ln(),
            ..template.clone()
        };
    }

    let err = ModelTrainer::new(config).train(records).unwrap_err();
    assert!(matches!(err, ModelError::Solver(SolverError::Singular { .. })));
}

#[test]
fn test_saved_model_scores_identically() {
    let records = linear_records(200, 21);
    let model = ModelTrainer::default().train(records.clone()).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    let loaded = FittedModel::from_json_str(&json).unwrap();

    for record in records.iter().take(20) {
        assert_abs_diff_eq!(
            loaded.predict_log_price(record),
            model.predict_log_price(record),
            epsilon = 1e-9
        );
    }
}
