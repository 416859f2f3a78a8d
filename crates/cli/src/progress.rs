//! Terminal spinner for long-running pipelines

use indicatif::{ProgressBar, ProgressStyle};
use lumi_core::Progress;
use std::path::Path;
use std::time::Duration;

/// Spinner on stderr driven by pipeline events
///
/// The bar draws on its own ticker thread. It is finished and cleared on
/// `done` or drop, so the caller's final status line always prints after it.
pub struct Spinner {
    bar: ProgressBar,
    phase: String,
    items: u64,
}

impl Spinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            bar,
            phase: String::new(),
            items: 0,
        }
    }
}

impl Progress for Spinner {
    fn start(&mut self, message: &str) {
        self.phase = message.to_string();
        self.items = 0;
        self.bar.set_message(format!("{}...", message));
    }

    fn item(&mut self, _path: &Path) {
        self.items += 1;
        if self.items % 64 == 0 {
            self.bar.set_message(format!("{}... {}", self.phase, self.items));
        }
    }

    fn done(&mut self, _message: &str) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
