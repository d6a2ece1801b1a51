/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif. All methods have default no-op
/// implementations, so embedders only override the phases they display.
pub trait ProgressReporter: Send + Sync {
    fn on_summary_start(&self, _total_tabs: usize) {}
    fn on_summary_progress(&self, _tabs_done: usize, _total_tabs: usize) {}
    fn on_summary_complete(&self, _acquired: usize, _duration_secs: f64) {}
    fn on_analysis_complete(&self, _duplicates: usize, _similar: usize, _duration_secs: f64) {}
    fn on_mapping_start(&self, _total_tabs: usize) {}
    fn on_mapping_complete(&self, _mapped: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
