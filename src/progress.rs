//! Count-style progress bars for video and row loops.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn count_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// Items processed out of `total`, labeled.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(count_style());
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// A progress bar that may be switched off. Hidden scopes cost nothing to update.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn count<T: Into<String>>(label: T, total: u64, enabled: bool) -> Self {
        let pb = if enabled {
            make_count_progress(total, &label.into())
        } else {
            ProgressBar::hidden()
        };
        Self { pb }
    }
    #[inline]
    pub fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }
    pub fn set_message<T: Into<String>>(&self, msg: T) {
        self.pb.set_message(msg.into());
    }
    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }
}
