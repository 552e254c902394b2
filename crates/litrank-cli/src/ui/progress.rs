//! Progress indicators for long-running CLI operations.
//!
//! Bars are drawn only on an interactive terminal; `--quiet`, `--json` and
//! redirected output get a hidden bar with the same API.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress feedback mode based on output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Interactive TTY: show animated progress bars
    Interactive,
    /// Non-TTY or `--quiet`: suppress progress, show only final results
    Quiet,
    /// Machine-readable (`--json`): no progress at all
    Silent,
}

impl ProgressMode {
    /// Detect the appropriate mode from flags and the terminal.
    pub fn detect(quiet: bool, json: bool) -> Self {
        if json {
            Self::Silent
        } else if quiet || !std::io::stderr().is_terminal() {
            Self::Quiet
        } else {
            Self::Interactive
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Progress bar characters.
const BAR_CHARS: &str = "█░";

const BAR_TEMPLATE: &str = "[{bar:20.cyan/dim}] {percent:>3}% ({pos}/{len}) {msg} ({elapsed})";

/// A progress bar wrapping indicatif.
pub struct Progress {
    bar: ProgressBar,
    mode: ProgressMode,
}

impl Progress {
    /// Create a progress bar for `total` steps.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let progress = Progress::bar(bundle.len() as u64, "Importing records", mode);
    /// ingest_bundle(store, &bundle, || progress.inc(1))?;
    /// progress.finish_with_message("[ok] Stored 3 entities, ...");
    /// ```
    pub fn bar(total: u64, message: &str, mode: ProgressMode) -> Self {
        let bar = if mode.is_interactive() {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                pb.set_style(style.progress_chars(BAR_CHARS));
            }
            pb.set_message(message.to_string());
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { bar, mode }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Finish and clear the progress line.
    pub fn finish_clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Clear the bar and print `message` in its place. Silent mode prints nothing.
    pub fn finish_with_message(&self, message: &str) {
        if self.mode.is_interactive() {
            self.bar.finish_and_clear();
        }
        if !message.is_empty() && self.mode != ProgressMode::Silent {
            println!("{}", message);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.bar.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_flags() {
        assert_eq!(ProgressMode::detect(false, true), ProgressMode::Silent);
        assert_eq!(ProgressMode::detect(true, true), ProgressMode::Silent);
        assert_eq!(ProgressMode::detect(true, false), ProgressMode::Quiet);
    }

    #[test]
    fn test_hidden_bar_counts() {
        let progress = Progress::bar(3, "Importing", ProgressMode::Quiet);
        progress.inc(2);
        assert_eq!(progress.bar.position(), 2);
        progress.finish_clear();
    }
}
