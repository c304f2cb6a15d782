// ABOUTME: The sequential download loop over resolved plans.
// ABOUTME: Skips files already on disk, streams the rest, and never lets one failure abort the run.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use castpull_feed::DownloadPlan;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::DownloadError;
use crate::http::HttpClient;
use crate::progress::ProgressReporter;

/// Transfer chunk size for streamed downloads.
const CHUNK_SIZE: usize = 8192;

/// Terminal status of one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemStatus {
    Downloaded { bytes: u64 },
    Skipped,
    Failed { reason: String },
}

/// One plan's outcome, in plan order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub target_filename: String,
    pub source_url: String,
    pub status: ItemStatus,
}

/// Outcome of a whole run, returned to the caller for reporting and
/// exit-code selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub reports: Vec<ItemReport>,
}

impl RunSummary {
    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Downloaded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.status)).count()
    }
}

/// Executes download plans strictly in order, one transfer at a time.
pub struct DownloadRunner<'a, C: HttpClient> {
    client: &'a C,
}

impl<'a, C: HttpClient> DownloadRunner<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Consumes the plan sequence in order. A plan whose target file already
    /// exists is skipped without any network traffic; re-running the tool
    /// against the same feed and output directory therefore re-downloads
    /// nothing it already has.
    pub fn run(&self, plans: &[DownloadPlan], progress: &dyn ProgressReporter) -> RunSummary {
        let mut summary = RunSummary::default();

        for plan in plans {
            let status = self.execute(plan, progress);
            match &status {
                ItemStatus::Downloaded { bytes } => {
                    debug!(file = %plan.target_filename, bytes, "downloaded");
                }
                ItemStatus::Skipped => {
                    debug!(file = %plan.target_filename, "already present, skipping");
                }
                ItemStatus::Failed { reason } => {
                    warn!(file = %plan.target_filename, %reason, "download failed");
                }
            }
            progress.item_finished(&plan.target_filename, &status);
            summary.reports.push(ItemReport {
                target_filename: plan.target_filename.clone(),
                source_url: plan.source_url.clone(),
                status,
            });
        }

        summary
    }

    fn execute(&self, plan: &DownloadPlan, progress: &dyn ProgressReporter) -> ItemStatus {
        if plan.target_path.exists() {
            return ItemStatus::Skipped;
        }

        match self.transfer(plan, progress) {
            Ok(bytes) => ItemStatus::Downloaded { bytes },
            Err(err) => {
                // Drop any partial file so the next run retries this episode.
                let _ = fs::remove_file(&plan.target_path);
                ItemStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Streams the source to the target in fixed-size chunks. The response
    /// stream and the file handle are scoped locals, released on every exit
    /// path including mid-transfer errors.
    fn transfer(
        &self,
        plan: &DownloadPlan,
        progress: &dyn ProgressReporter,
    ) -> Result<u64, DownloadError> {
        let mut stream = self.client.open_download(&plan.source_url)?;
        let mut file = fs::File::create(&plan.target_path)
            .map_err(|source| io_error(&plan.target_path, source))?;

        progress.item_started(&plan.target_filename, stream.content_length);

        let mut buf = [0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let n = stream
                .reader
                .read(&mut buf)
                .map_err(|source| io_error(&plan.target_path, source))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .map_err(|source| io_error(&plan.target_path, source))?;
            written += n as u64;
            progress.chunk_transferred(&plan.target_filename, written, stream.content_length);
        }

        file.flush()
            .map_err(|source| io_error(&plan.target_path, source))?;
        Ok(written)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DownloadError {
    DownloadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::http::DownloadStream;
    use crate::progress::NoopProgress;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::io::{self, Cursor, Read};
    use std::path::Path;
    use tempfile::TempDir;

    /// Serves canned bodies and counts how often a transfer was opened.
    struct FakeClient {
        bodies: HashMap<String, Vec<u8>>,
        opens: Cell<usize>,
        fail_mid_stream: Option<String>,
    }

    impl FakeClient {
        fn new(bodies: &[(&str, &[u8])]) -> Self {
            Self {
                bodies: bodies
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_vec()))
                    .collect(),
                opens: Cell::new(0),
                fail_mid_stream: None,
            }
        }
    }

    /// Yields a few bytes, then fails like a dropped connection.
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::Other, "connection reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"data");
            Ok(4)
        }
    }

    impl HttpClient for FakeClient {
        fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.bodies.get(url).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }

        fn open_download(&self, url: &str) -> Result<DownloadStream, FetchError> {
            self.opens.set(self.opens.get() + 1);
            if self.fail_mid_stream.as_deref() == Some(url) {
                return Ok(DownloadStream {
                    reader: Box::new(FailingReader { sent: false }),
                    content_length: None,
                });
            }
            match self.bodies.get(url) {
                Some(body) => Ok(DownloadStream {
                    reader: Box::new(Cursor::new(body.clone())),
                    content_length: Some(body.len() as u64),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn plan(dir: &Path, filename: &str, url: &str) -> DownloadPlan {
        DownloadPlan {
            source_url: url.to_string(),
            target_filename: filename.to_string(),
            target_path: dir.join(filename),
            title: filename.to_string(),
            published: None,
        }
    }

    #[test]
    fn test_downloads_every_plan_and_writes_files() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::new(&[
            ("https://cdn.example/ep1.mp3", b"one".as_slice()),
            ("https://cdn.example/ep2.mp3", b"two".as_slice()),
        ]);
        let plans = vec![
            plan(dir.path(), "ep1.mp3", "https://cdn.example/ep1.mp3"),
            plan(dir.path(), "ep2.mp3", "https://cdn.example/ep2.mp3"),
        ];

        let summary = DownloadRunner::new(&client).run(&plans, &NoopProgress);

        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.failed(), 0);
        assert_eq!(fs::read(dir.path().join("ep1.mp3")).unwrap(), b"one");
        assert_eq!(fs::read(dir.path().join("ep2.mp3")).unwrap(), b"two");
        assert_eq!(
            summary.reports[0].status,
            ItemStatus::Downloaded { bytes: 3 }
        );
    }

    #[test]
    fn test_second_run_skips_everything_without_transfers() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::new(&[("https://cdn.example/ep1.mp3", b"one".as_slice())]);
        let plans = vec![plan(dir.path(), "ep1.mp3", "https://cdn.example/ep1.mp3")];
        let runner = DownloadRunner::new(&client);

        let first = runner.run(&plans, &NoopProgress);
        assert_eq!(first.downloaded(), 1);
        assert_eq!(client.opens.get(), 1);

        let second = runner.run(&plans, &NoopProgress);
        assert_eq!(second.skipped(), 1);
        assert_eq!(second.downloaded(), 0);
        // Idempotence: no network traffic on the second pass.
        assert_eq!(client.opens.get(), 1);
    }

    #[test]
    fn test_one_failure_never_aborts_the_rest() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::new(&[
            ("https://cdn.example/ep1.mp3", b"one".as_slice()),
            ("https://cdn.example/ep3.mp3", b"three".as_slice()),
        ]);
        let plans = vec![
            plan(dir.path(), "ep1.mp3", "https://cdn.example/ep1.mp3"),
            plan(dir.path(), "ep2.mp3", "https://cdn.example/ep2.mp3"),
            plan(dir.path(), "ep3.mp3", "https://cdn.example/ep3.mp3"),
        ];

        let summary = DownloadRunner::new(&client).run(&plans, &NoopProgress);

        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            summary.reports[1].status,
            ItemStatus::Failed { .. }
        ));
        assert!(dir.path().join("ep3.mp3").exists());
    }

    #[test]
    fn test_mid_stream_failure_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let mut client = FakeClient::new(&[]);
        client.fail_mid_stream = Some("https://cdn.example/ep1.mp3".to_string());
        let plans = vec![plan(dir.path(), "ep1.mp3", "https://cdn.example/ep1.mp3")];

        let summary = DownloadRunner::new(&client).run(&plans, &NoopProgress);

        assert_eq!(summary.failed(), 1);
        // The partial file is gone, so a re-run will retry this episode.
        assert!(!dir.path().join("ep1.mp3").exists());
    }

    #[test]
    fn test_reports_preserve_plan_order() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::new(&[
            ("https://cdn.example/a.mp3", b"a".as_slice()),
            ("https://cdn.example/b.mp3", b"b".as_slice()),
        ]);
        let plans = vec![
            plan(dir.path(), "a.mp3", "https://cdn.example/a.mp3"),
            plan(dir.path(), "b.mp3", "https://cdn.example/b.mp3"),
        ];

        let summary = DownloadRunner::new(&client).run(&plans, &NoopProgress);

        let names: Vec<&str> = summary
            .reports
            .iter()
            .map(|r| r.target_filename.as_str())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    }
}
