use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tab_triage::ProgressReporter;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Inspection phase: progress bar (tab count known upfront)
/// - Process mapping phase: spinner
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_summary_start(&self, total_tabs: usize) {
        let pb = ProgressBar::new(total_tabs as u64);
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} Inspecting [{bar:30.cyan/dim}] {pos}/{len} tabs",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_summary_progress(&self, tabs_done: usize, _total_tabs: usize) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(tabs_done as u64);
            }
        }
    }

    fn on_summary_complete(&self, acquired: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Inspection complete: {} pages in {:.2}s",
            acquired, duration_secs
        );
    }

    fn on_analysis_complete(&self, duplicates: usize, similar: usize, duration_secs: f64) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Analysis complete: {} duplicate groups, {} similar groups in {:.2}s",
            duplicates, similar, duration_secs
        );
    }

    fn on_mapping_start(&self, _total_tabs: usize) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.set_message("Mapping tabs to processes...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_mapping_complete(&self, mapped: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Process mapping complete: {} tabs in {:.2}s",
            mapped, duration_secs
        );
    }
}
