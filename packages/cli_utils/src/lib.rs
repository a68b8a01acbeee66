#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the pincode sales CLI.
//!
//! [`GeocodeProgress`] shows a load as a spinner while the CSV is read and
//! switches to a bar once the number of records to geocode is known.
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so
//! log lines don't tear the bar.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pincode_sales_enrich::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] driven by a load session.
pub struct GeocodeProgress {
    bar: ProgressBar,
    /// Applied once `set_total()` gives the bar a length.
    bar_style: ProgressStyle,
}

impl GeocodeProgress {
    /// Adds a spinner to `multi` that becomes a bar with ETA once the
    /// record count is known.
    #[must_use]
    pub fn new(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Arc::new(Self::attach(multi.add(ProgressBar::new_spinner()), message))
    }

    fn attach(bar: ProgressBar, message: &str) -> Self {
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} pincodes {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self { bar, bar_style }
    }
}

impl ProgressCallback for GeocodeProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
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

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Returns the
/// [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn switches_to_bar_once_total_is_known() {
        let progress = GeocodeProgress::attach(
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()),
            "Loading",
        );
        assert_eq!(progress.bar.length(), None);

        progress.set_total(3);
        progress.inc(1);
        progress.inc(1);

        assert_eq!(progress.bar.length(), Some(3));
        assert_eq!(progress.bar.position(), 2);

        progress.finish("done".to_string());
        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.message(), "done");
    }
}
