// ABOUTME: Error types for feed fetching and episode downloads.
// ABOUTME: Fetch errors are fatal for the feed document, recoverable per episode.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the HTTP client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Transport-level failure (DNS, connect, timeout, mid-body reset).
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Creates a Network error from an underlying transport error.
    pub fn network(url: impl Into<String>, err: impl fmt::Display) -> Self {
        FetchError::Network {
            url: url.into(),
            reason: err.to_string(),
        }
    }
}

/// Per-plan download failure: either the transfer itself or local file I/O.
/// Recorded and reported; never aborts the remaining plans.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("i/o failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
