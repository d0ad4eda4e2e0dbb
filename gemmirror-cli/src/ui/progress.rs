//! Progress bar sink for mirror runs.

use console::style;
use gemmirror::mirror::{ErrorSink, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Console progress and error sink.
///
/// Errors are printed above the progress bar so the bar stays intact.
#[derive(Default)]
pub struct ConsoleReporter {
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    /// Create a reporter with no active bar.
    pub fn new() -> Self {
        Self::default()
    }

    fn create_bar(total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}

impl ProgressSink for ConsoleReporter {
    fn start(&mut self, total: usize, label: &str) {
        if let Some(old) = self.bar.take() {
            old.finish_and_clear();
        }
        if total == 0 {
            return;
        }
        println!("{}", style(label).cyan());
        self.bar = Some(Self::create_bar(total));
    }

    fn update(&mut self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
            bar.set_message(message.to_string());
        }
    }

    fn done(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl ErrorSink for ConsoleReporter {
    fn report(&mut self, message: &str) {
        let line = format!("{} {}", style("error:").red().bold(), message);
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}
