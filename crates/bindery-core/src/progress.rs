/// Trait for reporting pipeline progress.
///
/// The CLI implements this with indicatif bars; tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _files_discovered: usize, _duration_secs: f64) {}
    fn on_match_start(&self, _total_files: usize) {}
    fn on_match_progress(&self, _files_processed: usize, _total_files: usize) {}
    fn on_match_complete(&self, _files_matched: usize, _duration_secs: f64) {}
    fn on_attach_start(&self, _total_files: usize) {}
    fn on_attach_progress(&self, _files_processed: usize, _total_files: usize) {}
    fn on_attach_complete(&self, _attachments_created: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
