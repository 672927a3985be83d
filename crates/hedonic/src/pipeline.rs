//! End-to-end pipeline
//!
//! `build_dataset` loads the lookups, streams every price paid file through
//! the assembler into the JSON-lines dataset and writes the statistics.
//! `train_from_dataset` fits a model on a dataset written earlier, and `run`
//! does both.

use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use hedonic_data::error::require_exists;
use hedonic_data::{PricePaidReader, price_paid_files};
use hedonic_dataset::{
    ActivityCounts, DatasetAssembler, DatasetStats, GeocodeResolution, GeocodeSummary,
    LatestReading, Lookups, RegionalIndexSeries, log_summary, resolve_file,
};
use hedonic_model::{FittedModel, ModelTrainer};
use hedonic_output::{ExportFormat, Exporter, JsonLinesWriter, RunReport, read_json_lines};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Transactions between progress callbacks.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Observer for a dataset build.
///
/// Every method has an empty default.
pub trait BuildProgress {
    /// A price paid file is about to be read; `index` counts from zero.
    fn file_started(&self, _path: &Path, _index: usize, _total: usize) {}

    /// Transactions scanned so far across all files.
    fn scanned(&self, _scanned: u64) {}

    /// The build finished.
    fn finished(&self, _stats: &DatasetStats) {}
}

/// A [`BuildProgress`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BuildProgress for NoProgress {}

/// The lookups a dataset is assembled against.
#[derive(Debug, Clone)]
pub struct Sources {
    /// Postcodes in the region
    pub geocode: GeocodeResolution,
    /// Regional index series
    pub index: RegionalIndexSeries,
    /// Planning activity counts
    pub activity: ActivityCounts,
}

impl Sources {
    /// Load every lookup named by `config`.
    ///
    /// # Errors
    ///
    /// Fails when the data directory, gazetteer or index directory is
    /// missing, or a source lacks a required column. A missing planning file
    /// only produces a warning.
    pub fn load(config: &RunConfig) -> Result<Self> {
        require_exists("data directory", &config.sources.data_dir)?;

        let geocode = resolve_file(&config.sources.gazetteer_path(), &config.region)?;
        if geocode.lookup.is_empty() {
            warn!(
                "No postcodes within {} km of ({}, {}); every transaction will be rejected",
                config.region.radius_km, config.region.center.lat, config.region.center.lon
            );
        }

        let index = RegionalIndexSeries::load_dir(&config.sources.hpi_dir_path())?;

        let as_of = config.as_of_date();
        let activity = match config.sources.planning_path() {
            Some(path) => ActivityCounts::load(&path, as_of)?,
            None => {
                info!("No planning source configured; planning counts will be zero");
                ActivityCounts::default()
            }
        };

        Ok(Self {
            geocode,
            index,
            activity,
        })
    }

    /// Borrow the lookups for assembly.
    pub const fn lookups(&self) -> Lookups<'_> {
        Lookups {
            geocode: &self.geocode.lookup,
            index: &self.index,
            activity: &self.activity,
        }
    }
}

/// What a dataset build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Assembly counters across all files
    pub stats: DatasetStats,
    /// Geocode resolver counters
    pub geocode: GeocodeSummary,
    /// Latest reading per index region
    pub latest_hpi: BTreeMap<String, LatestReading>,
    /// Price paid files read
    pub files: Vec<PathBuf>,
    /// Rows the price paid reader could not use
    pub unreadable_rows: u64,
    /// Where the dataset was written
    pub dataset_path: PathBuf,
    /// Where the statistics were written
    pub stats_path: PathBuf,
}

impl BuildSummary {
    /// Report for this build.
    pub fn report(&self, config: &RunConfig) -> RunReport {
        RunReport::new(config.region.name.clone())
            .with_geocode(self.geocode)
            .with_stats(self.stats)
            .with_latest_hpi(self.latest_hpi.clone())
    }
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Dataset build
    pub build: BuildSummary,
    /// Trained model
    pub model: FittedModel,
    /// Where the model was written
    pub model_path: PathBuf,
}

impl RunOutcome {
    /// Report covering both the build and the model.
    pub fn report(&self, config: &RunConfig) -> RunReport {
        self.build.report(config).with_model(self.model.clone())
    }
}

/// Build the dataset described by `config`.
///
/// # Errors
///
/// Fails on configuration errors and on write failures. Rejected
/// transactions are counted, never errors.
pub fn build_dataset(config: &RunConfig) -> Result<BuildSummary> {
    build_dataset_with_progress(config, &NoProgress)
}

/// [`build_dataset`], reporting progress to `progress`.
///
/// # Errors
///
/// As [`build_dataset`].
pub fn build_dataset_with_progress(
    config: &RunConfig,
    progress: &dyn BuildProgress,
) -> Result<BuildSummary> {
    config.validate()?;
    let sources = Sources::load(config)?;
    let files = price_paid_files(&config.sources.price_paid_path())?;
    if files.is_empty() {
        warn!(
            "No price paid files under {}",
            config.sources.price_paid_path().display()
        );
    }

    let dataset_path = config.output.dataset_path();
    let mut writer = JsonLinesWriter::create(&dataset_path)?;
    let mut stats = DatasetStats::default();
    let mut unreadable_rows = 0;

    for (i, path) in files.iter().enumerate() {
        progress.file_started(path, i, files.len());
        let mut reader = PricePaidReader::from_path(path)?;

        let mut assembled = DatasetAssembler::new(sources.lookups()).assemble(&mut reader);
        let mut last_reported = 0;
        while let Some(record) = assembled.next() {
            writer.write(&record)?;
            let scanned = assembled.stats().scanned;
            if scanned - last_reported >= PROGRESS_INTERVAL {
                progress.scanned(stats.scanned + scanned);
                last_reported = scanned;
            }
        }
        let file_stats = assembled.into_stats();
        progress.scanned(stats.scanned + file_stats.scanned);

        info!(
            "{}: {} of {} transactions included, {} unreadable rows",
            path.display(),
            file_stats.included,
            file_stats.scanned,
            reader.skipped_rows()
        );
        unreadable_rows += reader.skipped_rows();
        stats.merge(&file_stats);
    }

    writer.finish()?;
    log_summary(&stats);
    progress.finished(&stats);

    let stats_path = config.output.stats_path();
    stats.export_to_file(&stats_path, ExportFormat::PrettyJson)?;
    info!(
        "Wrote {} records to {} and statistics to {}",
        stats.included,
        dataset_path.display(),
        stats_path.display()
    );

    Ok(BuildSummary {
        stats,
        geocode: sources.geocode.summary,
        latest_hpi: sources.index.latest(),
        files,
        unreadable_rows,
        dataset_path,
        stats_path,
    })
}

/// Train on the dataset at `config.output.dataset_path()` and write the model.
///
/// # Errors
///
/// Fails if the dataset is missing or unreadable, empty, or the solve is singular.
pub fn train_from_dataset(config: &RunConfig) -> Result<FittedModel> {
    let dataset_path = config.output.dataset_path();
    require_exists("dataset", &dataset_path)?;
    let records = read_json_lines(&dataset_path)?;
    info!("Read {} records from {}", records.len(), dataset_path.display());

    let model = ModelTrainer::new(config.training.clone()).train(records)?;
    let model_path = config.output.model_path();
    model.export_to_file(&model_path, ExportFormat::PrettyJson)?;
    info!("Wrote model to {}", model_path.display());
    Ok(model)
}

/// Build the dataset, then train on it.
///
/// # Errors
///
/// As [`build_dataset`] and [`train_from_dataset`].
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    run_with_progress(config, &NoProgress)
}

/// [`run`], reporting build progress to `progress`.
///
/// # Errors
///
/// As [`run`].
pub fn run_with_progress(config: &RunConfig, progress: &dyn BuildProgress) -> Result<RunOutcome> {
    let build = build_dataset_with_progress(config, progress)?;
    let model = train_from_dataset(config)?;
    Ok(RunOutcome {
        build,
        model,
        model_path: config.output.model_path(),
    })
}

/// Load a model written by a previous run.
///
/// # Errors
///
/// Fails if the file is missing or does not hold a consistent model.
pub fn load_model(path: &Path) -> Result<FittedModel> {
    require_exists("model", path)?;
    let json = fs::read_to_string(path)?;
    FittedModel::from_json_str(&json).map_err(PipelineError::from)
}
