//! Hedonic CLI binary.
//!
//! Builds the regional sales dataset, trains the ridge model and prints
//! run reports.

mod progress;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hedonic::dataset::UkRegion;
use hedonic::dataset::regions::DISTRICT_REGIONS;
use hedonic::model::SplitMode;
use hedonic::output::{DEFAULT_TOP_COEFFICIENTS, ExportFormat, Exporter, RunReport, read_json_lines};
use hedonic::{PipelineError, RunConfig};
use progress::{BuildBar, init_logger};
use serde_json::json;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "hedonic")]
#[command(about = "Hedonic house price model for a UK region", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that take precedence over the configuration file.
#[derive(Args)]
struct Overrides {
    /// Run configuration file (TOML); the built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the source files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for the dataset, statistics and model
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Ridge penalty
    #[arg(long, global = true)]
    lambda: Option<f64>,

    /// Train/test split (temporal or random)
    #[arg(long, global = true)]
    split: Option<SplitMode>,

    /// Random split seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Test share for the random split
    #[arg(long, global = true)]
    test_ratio: Option<f64>,

    /// Count planning activity back from this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the training dataset
    Build {
        /// Also write the dataset as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Train a model on a previously built dataset
    Train {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Build the dataset, then train a model on it
    Run {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List index regions and the districts mapped to them
    Regions {
        /// Show the districts of each region
        #[arg(long)]
        districts: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the report for a saved model
    Inspect {
        /// Model file; the configured model path when omitted
        #[arg(long)]
        model: Option<PathBuf>,

        /// Coefficients to list
        #[arg(long, default_value_t = DEFAULT_TOP_COEFFICIENTS)]
        top: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let multi = init_logger();

    match cli.command {
        Commands::Build { csv, format } => {
            let config = load_config(&cli.overrides)?;
            let bar = BuildBar::new(&multi);
            let result = hedonic::build_dataset_with_progress(&config, &bar);
            bar.clear();
            let summary = result?;

            if let Some(path) = csv {
                let records = read_json_lines(&summary.dataset_path)?;
                records.export_to_file(&path, ExportFormat::Csv)?;
                log::info!("Wrote {} records to {}", records.len(), path.display());
            }
            print_report(&summary.report(&config), format)?;
        }
        Commands::Train { format } => {
            let config = load_config(&cli.overrides)?;
            let model = hedonic::train_from_dataset(&config)?;
            let report = RunReport::new(config.region.name.clone()).with_model(model);
            print_report(&report, format)?;
        }
        Commands::Run { format } => {
            let config = load_config(&cli.overrides)?;
            let bar = BuildBar::new(&multi);
            let result = hedonic::run_with_progress(&config, &bar);
            bar.clear();
            let outcome = result?;
            print_report(&outcome.report(&config), format)?;
        }
        Commands::Regions { districts, format } => {
            list_regions(districts, format)?;
        }
        Commands::Inspect { model, top, format } => {
            let config = load_config(&cli.overrides)?;
            let path = model.unwrap_or_else(|| config.output.model_path());
            let model = hedonic::load_model(&path)?;
            let report = RunReport::new(config.region.name.clone())
                .with_model(model)
                .with_top_n(top);
            print_report(&report, format)?;
        }
    }

    Ok(())
}

fn load_config(overrides: &Overrides) -> Result<RunConfig, PipelineError> {
    let mut config = RunConfig::load(overrides.config.as_deref())?;

    if let Some(dir) = &overrides.data_dir {
        config.sources.data_dir = dir.clone();
    }
    if let Some(dir) = &overrides.out_dir {
        config.output.dir = dir.clone();
    }
    if let Some(lambda) = overrides.lambda {
        config.training.lambda = lambda;
    }
    if let Some(split) = overrides.split {
        config.training.split_mode = split;
    }
    if let Some(seed) = overrides.seed {
        config.training.seed = seed;
    }
    if let Some(ratio) = overrides.test_ratio {
        config.training.test_ratio = ratio;
    }
    if overrides.as_of.is_some() {
        config.as_of = overrides.as_of;
    }

    config.validate()?;
    Ok(config)
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Text => println!("{}", report.to_ascii_table()),
        OutputFormat::Markdown => println!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn region_districts(region: UkRegion) -> Vec<&'static str> {
    DISTRICT_REGIONS
        .iter()
        .filter(|(_, r)| *r == region)
        .map(|(district, _)| *district)
        .collect()
}

fn list_regions(show_districts: bool, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let regions = UkRegion::all();

    if format == OutputFormat::Json {
        let output: Vec<_> = regions
            .iter()
            .map(|r| {
                let mut entry = json!({ "slug": r.slug(), "name": r.name() });
                if show_districts {
                    entry["districts"] = json!(region_districts(*r));
                }
                entry
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\nHPI Regions ({}):", regions.len());
    println!("{}", "=".repeat(60));
    for region in &regions {
        let districts = region_districts(*region);
        println!("  {:<28} {:<24} {:>3} districts", region.slug(), region.name(), districts.len());
        if show_districts && !districts.is_empty() {
            for chunk in districts.chunks(4) {
                println!("      {}", chunk.join(", "));
            }
        }
    }
    println!("\nUnmapped districts use the {} series.", UkRegion::for_district("").name());
    Ok(())
}
