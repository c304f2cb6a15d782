// ABOUTME: Feed-to-download-plan resolution using feed-rs.
// ABOUTME: Selects at most one audio enclosure per entry and derives target filenames.

use crate::date_ext::{parse_entry_dates, ParsedEntryDates};
use crate::error::FeedError;
use crate::filename::{derive_filename, has_audio_extension};
use crate::models::{DownloadPlan, EnclosureCandidate, Resolution};
use crate::time_parse::parse_flexible_time;
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use std::path::Path;
use url::Url;

/// Resolves a feed document into an ordered sequence of download plans.
///
/// Entries are consumed in document order (feeds are assumed reverse
/// chronological; no re-sorting) until `max_episodes` plans exist; entries
/// past that point are not examined. Entries without a resolvable audio
/// enclosure are skipped and do not consume a slot.
///
/// # Arguments
/// * `data` - Raw feed bytes (RSS 2.0, Atom, or JSON Feed)
/// * `feed_url` - The URL the feed was fetched from; base for relative enclosure URLs
/// * `output_dir` - Directory target paths are rooted at
/// * `max_episodes` - Upper bound on the number of plans produced
///
/// # Errors
/// `FeedError::Parse` when the document is not recognizable as a feed.
pub fn resolve_plans(
    data: &[u8],
    feed_url: &str,
    output_dir: &Path,
    max_episodes: usize,
) -> Result<Resolution, FeedError> {
    let parsed = feed_rs::parser::parse(data).map_err(FeedError::parse)?;

    // Raw-XML pass for date strings feed-rs could not parse into timestamps.
    let raw_dates = parse_entry_dates(data);

    let mut resolution = Resolution::default();

    for (index, entry) in parsed.entries.iter().enumerate() {
        if resolution.plans.len() >= max_episodes {
            break;
        }
        resolution.entries_examined += 1;

        let Some(candidate) = select_enclosure(entry) else {
            resolution.entries_skipped += 1;
            continue;
        };
        let Some(source_url) = resolve_source_url(&candidate.url, feed_url) else {
            resolution.entries_skipped += 1;
            continue;
        };

        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.clone())
            .unwrap_or_default();
        let published = entry_published(entry, &raw_dates, index);

        let target_filename = derive_filename(published.as_ref(), &title, &source_url);
        let target_path = output_dir.join(&target_filename);

        resolution.plans.push(DownloadPlan {
            source_url,
            target_filename,
            target_path,
            title,
            published,
        });
    }

    Ok(resolution)
}

/// Searches an entry for its audio enclosure. First match wins, in priority
/// order: enclosure links, media content (RSS `<enclosure>` and
/// `media:content` both land here), then any other link that looks like audio.
fn select_enclosure(entry: &Entry) -> Option<EnclosureCandidate> {
    for link in &entry.links {
        if !is_enclosure_link(link) {
            continue;
        }
        let candidate = EnclosureCandidate {
            url: link.href.clone(),
            media_type: link.media_type.clone(),
        };
        if is_audio_candidate(&candidate) {
            return Some(candidate);
        }
    }

    for media in &entry.media {
        for content in &media.content {
            if let Some(ref url) = content.url {
                let candidate = EnclosureCandidate {
                    url: url.to_string(),
                    media_type: content.content_type.as_ref().map(|m| m.to_string()),
                };
                if is_audio_candidate(&candidate) {
                    return Some(candidate);
                }
            }
        }
    }

    for link in &entry.links {
        if is_enclosure_link(link) {
            continue;
        }
        let declared_audio = link
            .media_type
            .as_deref()
            .is_some_and(|t| t.starts_with("audio/"));
        if declared_audio || has_audio_extension(&link.href) {
            return Some(EnclosureCandidate {
                url: link.href.clone(),
                media_type: link.media_type.clone(),
            });
        }
    }

    None
}

/// An audio candidate declares an `audio/` type, or declares no type but
/// points at a recognized audio extension.
fn is_audio_candidate(candidate: &EnclosureCandidate) -> bool {
    match candidate.media_type.as_deref() {
        Some(media_type) => media_type.starts_with("audio/"),
        None => has_audio_extension(&candidate.url),
    }
}

/// Checks if a link is an enclosure link (rel == "enclosure").
fn is_enclosure_link(link: &Link) -> bool {
    link.rel.as_deref() == Some("enclosure")
}

/// Absolute candidate URLs pass through; relative ones are joined against the
/// feed URL. Returns None when no absolute URL can be formed; the caller drops
/// the entry as skipped.
fn resolve_source_url(candidate_url: &str, feed_url: &str) -> Option<String> {
    match Url::parse(candidate_url) {
        Ok(absolute) => Some(absolute.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(feed_url).ok()?;
            base.join(candidate_url).ok().map(Into::into)
        }
        Err(_) => None,
    }
}

/// The entry's published timestamp: what feed-rs parsed, else the raw
/// document string run through the flexible parser.
fn entry_published(
    entry: &Entry,
    raw_dates: &ParsedEntryDates,
    index: usize,
) -> Option<DateTime<Utc>> {
    entry.published.or(entry.updated).or_else(|| {
        raw_dates
            .get(&entry.id, index)
            .and_then(parse_flexible_time)
    })
}
