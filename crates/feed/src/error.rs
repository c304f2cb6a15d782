// ABOUTME: Error types for feed resolution.
// ABOUTME: A document that cannot be parsed as RSS/Atom is fatal and produces zero plans.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while resolving a feed document into download plans.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document could not be parsed as RSS or Atom at all.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

impl FeedError {
    /// Creates a Parse error from an underlying feed-rs error.
    pub fn parse(err: impl fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }
}
