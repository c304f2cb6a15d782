// ABOUTME: Filename derivation for downloaded episodes.
// ABOUTME: Sanitizes titles into a safe charset and picks an audio extension from the source URL.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use url::Url;

/// Extensions accepted from a source URL; anything else falls back to mp3.
static AUDIO_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mp3", "m4a", "m4b", "aac", "ogg", "oga", "opus", "flac", "wav", "wma",
    ]
    .into_iter()
    .collect()
});

const DEFAULT_EXTENSION: &str = "mp3";
const FALLBACK_STEM: &str = "episode";

/// Maps a title (or URL stem) into the safe filename charset `[A-Za-z0-9._-]`.
///
/// Whitespace and every other disallowed character become `_`, runs of `_`
/// collapse to one, and leading/trailing `_` are trimmed. May return an empty
/// string when nothing survives; callers fall back to another source.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_underscore = false;
    for ch in raw.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-') {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
    }
    out.trim_matches('_').to_string()
}

/// Picks the output extension from the URL's final path segment.
///
/// A trailing `.<1-5 alphanumerics>` suffix is accepted only when it names a
/// recognized audio format; everything else falls back to `mp3`.
pub fn audio_extension(source_url: &str) -> String {
    final_path_segment(source_url)
        .and_then(|segment| recognized_extension(&segment))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// True when the URL's final path segment carries a recognized audio extension.
pub fn has_audio_extension(url: &str) -> bool {
    final_path_segment(url)
        .and_then(|segment| recognized_extension(&segment))
        .is_some()
}

/// Derives the complete target filename for one entry.
///
/// Layout is `YYYY-MM-DD_<title>.<ext>` when a published date is known, else
/// `<title>.<ext>`. The title part falls back to the URL's path-segment stem,
/// then to a fixed stem, so the result is never empty.
pub fn derive_filename(
    published: Option<&DateTime<Utc>>,
    title: &str,
    source_url: &str,
) -> String {
    let ext = audio_extension(source_url);

    let mut base = sanitize_component(title);
    if base.is_empty() {
        base = final_path_segment(source_url)
            .map(|segment| sanitize_component(strip_extension(&segment)))
            .unwrap_or_default();
    }
    if base.is_empty() {
        base = FALLBACK_STEM.to_string();
    }

    match published {
        Some(date) => format!("{}_{}.{}", date.format("%Y-%m-%d"), base, ext),
        None => format!("{}.{}", base, ext),
    }
}

fn recognized_extension(segment: &str) -> Option<String> {
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > 5
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    AUDIO_EXTENSIONS.contains(ext.as_str()).then_some(ext)
}

/// The segment with a plausible extension suffix removed, recognized or not.
fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => segment,
    }
}

/// Last non-empty path segment of the URL, query and fragment excluded.
/// Falls back to plain string splitting for URLs that are not absolute.
fn final_path_segment(source_url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(source_url) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string);
    }

    let without_suffix = source_url
        .split(['?', '#'])
        .next()
        .unwrap_or(source_url);
    without_suffix
        .rsplit('/')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
