/// Trait for reporting analysis progress.
///
/// The CLI implements it with indicatif bars. All methods have default no-op
/// implementations.
pub trait ProgressReporter {
    fn on_index_start(&self) {}
    fn on_index_progress(&self, _files_indexed: usize, _current_path: &str) {}
    fn on_index_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_classify_start(&self, _total_files: usize) {}
    fn on_classify_progress(&self, _files_done: usize, _total_files: usize) {}
    fn on_classify_complete(&self, _groups: usize, _unique: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
