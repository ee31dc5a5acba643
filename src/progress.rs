//! Count-style progress bars for the two fetch passes.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const COUNT_TEMPLATE: &str = "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
                              it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}";

/// Thin wrapper around an `indicatif` count bar.
/// `ProgressScope::count(..)` when progress is on, `ProgressScope::hidden()` otherwise.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn count<T: Into<String>>(label: T, total: u64) -> Self {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::with_template(COUNT_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        pb.set_style(style);
        let label = label.into();
        if !label.is_empty() {
            pb.set_message(label);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn hidden() -> Self {
        Self { pb: ProgressBar::hidden() }
    }

    /// `count` or `hidden` depending on the run's progress flag.
    pub fn when<T: Into<String>>(enabled: bool, label: T, total: u64) -> Self {
        if enabled { Self::count(label, total) } else { Self::hidden() }
    }

    #[inline]
    pub fn inc_items(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }
}
