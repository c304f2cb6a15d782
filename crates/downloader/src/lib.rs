// ABOUTME: Sequential episode download execution for castpull.
// ABOUTME: Provides the HTTP client seam, progress reporting, and the skip/download/fail loop.

pub mod error;
pub mod http;
pub mod options;
pub mod progress;
pub mod runner;

pub use error::{DownloadError, FetchError};
pub use http::{DownloadStream, HttpClient, ReqwestClient};
pub use options::ClientOptions;
pub use progress::{NoopProgress, ProgressReporter};
pub use runner::{DownloadRunner, ItemReport, ItemStatus, RunSummary};
