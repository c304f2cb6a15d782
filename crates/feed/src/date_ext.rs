// ABOUTME: Raw XML extraction of per-item publication date strings.
// ABOUTME: Recovers pubDate/published/dc:date text that feed-rs fails to turn into timestamps.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;

enum Field {
    Guid,
    Date,
    Updated,
}

/// Raw date strings collected per item from the feed document.
#[derive(Debug, Default, Clone)]
pub struct ParsedEntryDates {
    /// Map from item guid (or Atom id) to the raw date string.
    items: HashMap<String, String>,
    /// Date strings in document order, for items without a usable guid.
    by_index: Vec<Option<String>>,
}

impl ParsedEntryDates {
    /// Looks up the raw date string for an item by guid, falling back to its
    /// document-order index.
    pub fn get(&self, guid: &str, index: usize) -> Option<&str> {
        self.items
            .get(guid)
            .map(String::as_str)
            .or_else(|| self.by_index.get(index).and_then(|d| d.as_deref()))
    }
}

/// Collects raw `pubDate`/`published`/`dc:date`/`updated` strings per item.
///
/// `pubDate`, `published`, and `dc:date` take precedence over `updated`; the
/// first value per item wins. Parsing is lenient and stops silently at the
/// first XML error, matching the tolerance of the main parser.
pub fn parse_entry_dates(data: &[u8]) -> ParsedEntryDates {
    let mut result = ParsedEntryDates::default();
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_item = false;
    let mut current_guid: Option<String> = None;
    let mut current_date: Option<String> = None;
    let mut current_updated: Option<String> = None;
    let mut current_field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                match local {
                    "item" | "entry" => {
                        in_item = true;
                        current_guid = None;
                        current_date = None;
                        current_updated = None;
                    }
                    "guid" | "id" if in_item => current_field = Some(Field::Guid),
                    // "date" covers dc:date after namespace-prefix stripping.
                    "pubDate" | "published" | "date" if in_item => {
                        current_field = Some(Field::Date)
                    }
                    "updated" if in_item => current_field = Some(Field::Updated),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref field) = current_field {
                    let text = e.decode().map(|s| s.into_owned()).unwrap_or_default();
                    if !text.is_empty() {
                        match field {
                            Field::Guid => current_guid = Some(text),
                            Field::Date => {
                                if current_date.is_none() {
                                    current_date = Some(text);
                                }
                            }
                            Field::Updated => {
                                if current_updated.is_none() {
                                    current_updated = Some(text);
                                }
                            }
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = name.split(':').last().unwrap_or(&name);

                if matches!(local, "item" | "entry") {
                    let date = current_date.take().or_else(|| current_updated.take());
                    if let (Some(guid), Some(date_str)) = (current_guid.take(), date.as_ref()) {
                        result.items.insert(guid, date_str.clone());
                    }
                    result.by_index.push(date);
                    in_item = false;
                }
                current_field = None;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_keyed_by_guid_and_index() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test</title>
        <item>
            <guid>ep-1</guid>
            <title>Episode 1</title>
            <pubDate>Mon, 2 Jan 2006 15:04:05 MST</pubDate>
        </item>
        <item>
            <title>Episode 2</title>
            <pubDate>Tue, 3 Jan 2006 15:04:05 MST</pubDate>
        </item>
    </channel>
</rss>"#;

        let dates = parse_entry_dates(rss.as_bytes());
        assert_eq!(dates.get("ep-1", 0), Some("Mon, 2 Jan 2006 15:04:05 MST"));
        // No guid on the second item: index fallback.
        assert_eq!(
            dates.get("generated-id", 1),
            Some("Tue, 3 Jan 2006 15:04:05 MST")
        );
    }

    #[test]
    fn test_pubdate_preferred_over_updated() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Test</title>
    <entry>
        <id>urn:ep-1</id>
        <updated>2024-02-01T00:00:00Z</updated>
        <published>2024-01-01T00:00:00Z</published>
    </entry>
</feed>"#;

        let dates = parse_entry_dates(atom.as_bytes());
        assert_eq!(dates.get("urn:ep-1", 0), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_item_without_date() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <item><guid>ep-1</guid><title>No date</title></item>
    </channel>
</rss>"#;

        let dates = parse_entry_dates(rss.as_bytes());
        assert_eq!(dates.get("ep-1", 0), None);
    }
}
