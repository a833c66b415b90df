//! Lightweight feed-entry extraction.
//!
//! Pulls candidate stories out of RSS `<item>` and Atom `<entry>` blocks with
//! regular expressions. There is no XML tree: nesting, namespaces and malformed
//! markup are not handled, and a block is never required to be well formed.

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use crate::domain::FeedEntry;

pub const MAX_ENTRIES: usize = 5;
pub const DESCRIPTION_LIMIT: usize = 200;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<item\b[^>]*>(.*?)</item\s*>|<entry\b[^>]*>(.*?)</entry\s*>")
        .expect("block pattern")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title pattern"));
static LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>(.*?)</link\s*>").expect("link pattern"));
static LINK_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*["']([^"']*)["']"#).expect("href pattern")
});
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<description\b[^>]*>(.*?)</description\s*>|<summary\b[^>]*>(.*?)</summary\s*>")
        .expect("description pattern")
});
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata pattern"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

#[derive(Debug, Clone)]
pub struct FeedParser {
    max_entries: usize,
    description_limit: usize,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self::with_limits(MAX_ENTRIES, DESCRIPTION_LIMIT)
    }

    pub fn with_limits(max_entries: usize, description_limit: usize) -> Self {
        Self {
            max_entries,
            description_limit,
        }
    }

    /// Extract up to `max_entries` candidates in document order.
    ///
    /// Missing title, link or description come back as empty strings.
    pub fn parse(&self, xml: &str) -> Vec<FeedEntry> {
        BLOCK_RE
            .captures_iter(xml)
            .take(self.max_entries)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|block| self.parse_block(block.as_str()))
            .collect()
    }

    pub fn parse_bytes(&self, body: &[u8]) -> Vec<FeedEntry> {
        self.parse(&String::from_utf8_lossy(body))
    }

    fn parse_block(&self, block: &str) -> FeedEntry {
        let title = TITLE_RE
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_default();

        let url = LINK_TEXT_RE
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .filter(|link| !link.is_empty())
            .or_else(|| {
                LINK_HREF_RE
                    .captures(block)
                    .and_then(|c| c.get(1))
                    .map(|m| decode_html_entities(m.as_str().trim()).to_string())
            })
            .unwrap_or_default();

        let description = DESCRIPTION_RE
            .captures(block)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| truncate_chars(&clean_text(m.as_str()), self.description_limit))
            .unwrap_or_default();

        FeedEntry {
            title,
            url,
            description,
        }
    }
}

/// Unwrap CDATA, decode entities, drop tags and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let unwrapped = CDATA_RE.replace_all(raw, "$1");
    let decoded = decode_html_entities(&unwrapped);
    let stripped = TAG_RE.replace_all(&decoded, " ");
    SPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Channel Title</title>
    <item>
      <title><![CDATA[Future & Metro Drop Surprise Tape]]></title>
      <link>https://example.com/future-metro</link>
      <description><![CDATA[<p>The duo returns with <b>new</b> music.</p>]]></description>
    </item>
    <item>
      <title>Second &amp; Last</title>
      <link>https://example.com/second</link>
      <description>&lt;p&gt;Escaped markup&lt;/p&gt;</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Feed</title>
  <entry>
    <title type="html">Atom Entry</title>
    <link rel="alternate" href="https://example.com/atom-entry"/>
    <id>urn:1</id>
    <summary>Summary text</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_minimal_item() {
        let entries = FeedParser::new().parse("<item><title>A</title><link>http://x</link></item>");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "A");
        assert_eq!(entries[0].url, "http://x");
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn test_rss_strips_cdata_and_tags() {
        let entries = FeedParser::new().parse(RSS_SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Future & Metro Drop Surprise Tape");
        assert_eq!(entries[0].description, "The duo returns with new music.");
        assert_eq!(entries[1].title, "Second & Last");
        assert_eq!(entries[1].description, "Escaped markup");
    }

    #[test]
    fn test_channel_title_is_not_an_entry() {
        let entries = FeedParser::new().parse(RSS_SAMPLE);
        assert!(entries.iter().all(|e| e.title != "Channel Title"));
    }

    #[test]
    fn test_atom_link_href() {
        let entries = FeedParser::new().parse(ATOM_SAMPLE);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Atom Entry");
        assert_eq!(entries[0].url, "https://example.com/atom-entry");
        assert_eq!(entries[0].description, "Summary text");
    }

    #[test]
    fn test_takes_first_five_blocks() {
        let xml: String = (0..8)
            .map(|i| format!("<item><title>T{}</title><link>http://x/{}</link></item>", i, i))
            .collect();
        let entries = FeedParser::new().parse(&xml);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[4].title, "T4");
    }

    #[test]
    fn test_description_truncated_to_limit() {
        let long = "é".repeat(300);
        let xml = format!("<item><title>T</title><description>{}</description></item>", long);
        let entries = FeedParser::new().parse(&xml);
        assert_eq!(entries[0].description.chars().count(), DESCRIPTION_LIMIT);
    }

    #[test]
    fn test_no_blocks_yields_nothing() {
        assert!(FeedParser::new().parse("<html><body>not a feed</body></html>").is_empty());
    }

    #[test]
    fn test_parse_bytes_lossy() {
        let entries = FeedParser::new().parse_bytes(b"<entry><title>Bytes</title></entry>");
        assert_eq!(entries[0].title, "Bytes");
        assert_eq!(entries[0].url, "");
    }
}
