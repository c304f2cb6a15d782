// ABOUTME: Internal Rust models for resolved download plans.
// ABOUTME: Candidates are transient during resolution; plans are consumed by the download runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate audio reference discovered on a feed entry.
///
/// Multiple candidates may exist per entry (enclosure links, media content,
/// plain links); the resolver selects at most one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnclosureCandidate {
    pub url: String,
    pub media_type: Option<String>,
}

/// The resolved, ready-to-execute description of one file to download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadPlan {
    /// Absolute URL of the audio resource.
    pub source_url: String,
    /// Sanitized, filesystem-safe filename derived from date + title + extension.
    pub target_filename: String,
    /// `output_dir` joined with `target_filename`.
    pub target_path: PathBuf,
    /// Entry title, for display. Empty when the feed declares none.
    pub title: String,
    /// Published timestamp, when one could be determined.
    pub published: Option<DateTime<Utc>>,
}

/// The outcome of resolving a feed document into download plans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// At most `max_episodes` plans, in original feed order.
    pub plans: Vec<DownloadPlan>,
    /// Entries looked at before the plan quota was reached.
    pub entries_examined: usize,
    /// Entries dropped for lacking a resolvable audio enclosure.
    pub entries_skipped: usize,
}
