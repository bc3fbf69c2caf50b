#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the `airzone` binary.
//!
//! [`IndicatifProgress`] renders pipeline progress, and [`init_logger`]
//! routes `log` output through the same [`MultiProgress`] so log lines are
//! printed above the bar instead of through it.

use std::sync::Arc;
use std::time::Duration;

use airzone_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const BAR_TEMPLATE: &str = "  {msg} {wide_bar:.cyan/dim} {pos}/{len} zones [{elapsed}<{eta}]";

/// Progress of one pipeline run, drawn with `indicatif`.
///
/// Spins while the feature list is being fetched; the feature count from
/// [`ProgressCallback::set_total`] turns it into a bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
    counted: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds a run's progress line to `multi`, labelled with the dataset
    /// name.
    #[must_use]
    pub fn features_bar(multi: &MultiProgress, dataset: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("{dataset}: fetching"));
        bar.enable_steady_tick(Duration::from_millis(120));

        let counted = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        Arc::new(Self { bar, counted })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counted.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` (filtered by `RUST_LOG`) behind an
/// `indicatif-log-bridge` wrapper.
///
/// Every progress bar must be added to the returned [`MultiProgress`] for
/// log output to stay readable.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if let Err(e) = indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init() {
        eprintln!("logger already initialized: {e}");
    }
    log::set_max_level(max_level);

    multi
}
