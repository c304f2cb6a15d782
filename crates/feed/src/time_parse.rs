// ABOUTME: Flexible date parsing for raw RSS/Atom date strings.
// ABOUTME: Used when feed-rs leaves an entry dateless but the document carries a pubDate.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses a datetime string using the formats feeds emit in practice.
/// Returns UTC on success, None when no format matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC3339 (Atom) and RFC2822 (RSS) cover most feeds.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Variants chrono's RFC2822 parser rejects: single-digit days, missing
    // weekday, compact ISO offsets.
    const OFFSET_FORMATS: &[&str] = &[
        "%a, %e %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S %z",
        "%e %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%z",
    ];
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    if let Some(dt) = parse_named_timezone(s) {
        return Some(dt);
    }

    // No timezone at all: assume UTC.
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// chrono's `%Z` cannot parse abbreviations like PDT; strip the name and apply
/// its offset manually.
fn parse_named_timezone(s: &str) -> Option<DateTime<Utc>> {
    let (base, name) = s.rsplit_once(' ')?;
    let offset_secs = named_offset(name)?;

    const BASE_FORMATS: &[&str] = &[
        "%a, %d %b %Y %H:%M:%S",
        "%a, %e %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
    ];
    for fmt in BASE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(base.trim_end(), fmt) {
            let offset = FixedOffset::east_opt(offset_secs)?;
            let dt = offset.from_local_datetime(&naive).single()?;
            return Some(dt.with_timezone(&Utc));
        }
    }
    None
}

/// Offsets for the US zone names feeds still use, plus GMT/UTC spellings.
fn named_offset(name: &str) -> Option<i32> {
    let hours = match name {
        "GMT" | "UT" | "UTC" | "Z" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => return None,
    };
    Some(hours * 3600)
}
