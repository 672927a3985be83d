//! Terminal progress and logging.

use hedonic::BuildProgress;
use hedonic::dataset::DatasetStats;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// log lines do not tear progress bars.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
pub(crate) fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

/// Spinner showing the file being read and the running transaction count.
pub(crate) struct BuildBar {
    bar: ProgressBar,
}

impl BuildBar {
    pub(crate) fn new(multi: &MultiProgress) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Loading lookups...");
        Self { bar }
    }

    /// Remove the spinner if the build stopped before finishing.
    pub(crate) fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl BuildProgress for BuildBar {
    fn file_started(&self, path: &Path, index: usize, total: usize) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_prefix(format!("[{}/{}] {name}", index + 1, total));
    }

    fn scanned(&self, scanned: u64) {
        self.bar.set_message(format!("{scanned} transactions"));
    }

    fn finished(&self, stats: &DatasetStats) {
        self.bar.finish_with_message(format!(
            "{} of {} transactions included",
            stats.included, stats.scanned
        ));
    }
}
