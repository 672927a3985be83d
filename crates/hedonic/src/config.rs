//! Run configuration
//!
//! A run is described by a TOML document with `[region]`, `[training]`,
//! `[sources]` and `[output]` tables. Every field has a default; the
//! defaults are also shipped as `config/default.toml`.

use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, Utc};
use hedonic_dataset::RegionConfig;
use hedonic_model::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The configuration used when no file is given.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Input locations.
///
/// Relative paths are resolved against `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Base directory for the other sources (default: `data`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Postcode gazetteer CSV (default: `onspd.csv`)
    #[serde(default = "default_gazetteer")]
    pub gazetteer: PathBuf,

    /// Price paid CSV file, or a directory of them (default: `price-paid`)
    #[serde(default = "default_price_paid")]
    pub price_paid: PathBuf,

    /// Directory of per-region index files (default: `hpi`)
    #[serde(default = "default_hpi_dir")]
    pub hpi_dir: PathBuf,

    /// Planning applications JSON; planning counts are zero without it
    #[serde(default = "default_planning")]
    pub planning: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_gazetteer() -> PathBuf {
    PathBuf::from("onspd.csv")
}

fn default_price_paid() -> PathBuf {
    PathBuf::from("price-paid")
}

fn default_hpi_dir() -> PathBuf {
    PathBuf::from("hpi")
}

fn default_planning() -> Option<PathBuf> {
    Some(PathBuf::from("planning.json"))
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gazetteer: default_gazetteer(),
            price_paid: default_price_paid(),
            hpi_dir: default_hpi_dir(),
            planning: default_planning(),
        }
    }
}

impl SourcesConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Resolved gazetteer path
    pub fn gazetteer_path(&self) -> PathBuf {
        self.resolve(&self.gazetteer)
    }

    /// Resolved price paid path
    pub fn price_paid_path(&self) -> PathBuf {
        self.resolve(&self.price_paid)
    }

    /// Resolved index directory
    pub fn hpi_dir_path(&self) -> PathBuf {
        self.resolve(&self.hpi_dir)
    }

    /// Resolved planning path, if configured
    pub fn planning_path(&self) -> Option<PathBuf> {
        self.planning.as_deref().map(|p| self.resolve(p))
    }
}

/// Output locations.
///
/// File names are resolved against `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: `output`)
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Assembled dataset, one record per line (default: `dataset.jsonl`)
    #[serde(default = "default_dataset_file")]
    pub dataset_file: PathBuf,

    /// Assembly statistics (default: `stats.json`)
    #[serde(default = "default_stats_file")]
    pub stats_file: PathBuf,

    /// Fitted model (default: `model.json`)
    #[serde(default = "default_model_file")]
    pub model_file: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_dataset_file() -> PathBuf {
    PathBuf::from("dataset.jsonl")
}

fn default_stats_file() -> PathBuf {
    PathBuf::from("stats.json")
}

fn default_model_file() -> PathBuf {
    PathBuf::from("model.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            dataset_file: default_dataset_file(),
            stats_file: default_stats_file(),
            model_file: default_model_file(),
        }
    }
}

impl OutputConfig {
    /// Resolved dataset path
    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(&self.dataset_file)
    }

    /// Resolved statistics path
    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(&self.stats_file)
    }

    /// Resolved model path
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Date planning activity is counted back from (default: today)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    /// Target region
    #[serde(default)]
    pub region: RegionConfig,

    /// Model hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,

    /// Input locations
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Toml`] if the document does not parse.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load `path`, or the embedded default when `None`, and validate it.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, does not parse, or does not validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    PipelineError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::from_toml_str(DEFAULT_CONFIG)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.region
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.training
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if self.output.dataset_file.as_os_str().is_empty() {
            return Err(PipelineError::Config("output.dataset_file is empty".to_string()));
        }
        Ok(())
    }

    /// The configured `as_of` date, or today.
    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedonic_model::SplitMode;
    use rstest::rstest;

    #[test]
    fn test_embedded_default_matches_default() {
        let parsed = RunConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, RunConfig::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(RunConfig::from_toml_str("").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = RunConfig::from_toml_str(
            r#"
            as_of = "2024-06-30"

            [region]
            name = "croydon"
            radius_km = 3.5

            [training]
            split_mode = "random"
            seed = 7

            [sources]
            data_dir = "/srv/hedonic"
            planning = "/tmp/planning.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.region.name, "croydon");
        assert_eq!(config.region.radius_km, 3.5);
        assert_eq!(config.region.allowed_postcode_areas, vec!["SE", "BR", "CR"]);
        assert_eq!(config.training.split_mode, SplitMode::Random);
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.lambda, 1.0);

        assert_eq!(config.sources.gazetteer_path(), PathBuf::from("/srv/hedonic/onspd.csv"));
        assert_eq!(config.sources.hpi_dir_path(), PathBuf::from("/srv/hedonic/hpi"));
        assert_eq!(config.sources.planning_path(), Some(PathBuf::from("/tmp/planning.json")));
        assert_eq!(config.output.model_path(), PathBuf::from("output/model.json"));
    }

    #[rstest]
    #[case("[region]\nradius_km = 0.0")]
    #[case("[region]\nradius_km = -2.0")]
    #[case("[region]\nallowed_postcode_areas = []")]
    #[case("[training]\nlambda = -1.0")]
    #[case("[training]\ntest_ratio = 1.5")]
    #[case("[output]\ndataset_file = \"\"")]
    fn test_invalid_settings(#[case] toml: &str) {
        let config = RunConfig::from_toml_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[rstest]
    #[case("[training]\nsplit_mode = \"kfold\"")]
    #[case("[region\nname = 1")]
    fn test_unparsable(#[case] toml: &str) {
        assert!(matches!(RunConfig::from_toml_str(toml), Err(PipelineError::Toml(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_as_of_pinned() {
        let config = RunConfig {
            as_of: NaiveDate::from_ymd_opt(2023, 3, 1),
            ..RunConfig::default()
        };
        assert_eq!(config.as_of_date(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }
}
