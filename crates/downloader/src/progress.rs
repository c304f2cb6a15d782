// ABOUTME: Observational progress signals emitted during downloads.
// ABOUTME: Purely side-effecting; reporters never influence the run outcome.

use crate::runner::ItemStatus;

/// Receives per-item and per-chunk notifications from the download runner.
///
/// All methods default to no-ops so reporters implement only what they show.
pub trait ProgressReporter {
    /// A transfer is about to begin; total size when the server declared one.
    fn item_started(&self, _filename: &str, _total_bytes: Option<u64>) {}

    /// Bytes written so far for the current item.
    fn chunk_transferred(&self, _filename: &str, _bytes_so_far: u64, _total_bytes: Option<u64>) {}

    /// The item reached a terminal status (downloaded, skipped, or failed).
    fn item_finished(&self, _filename: &str, _status: &ItemStatus) {}
}

/// Reporter that ignores every signal.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {}
