//! RSS 2.0 / MRSS feed parsing into [`VideoRecord`]s.
//!
//! Parsing is best-effort: missing or malformed item metadata degrades to empty
//! strings, items without a title or link are dropped, and a document that is
//! not well-formed XML yields no records at all. Nothing here returns an error
//! to the caller.
//!
//! Media URLs are recovered through an ordered chain of extractors because feed
//! producers disagree on how (or whether) they qualify `media:*` elements. Each
//! `<item>` is first captured as a flat list of [`ItemElement`] snapshots, and
//! the extractors run over that list, so they do not depend on how the XML
//! reader reports prefixes or namespaces.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use serde::Serialize;
use thiserror::Error;

/// Namespace URI of the Media RSS extension.
pub const MRSS_NAMESPACE: &str = "http://search.yahoo.com/mrss/";

/// One playable (or at least linkable) entry from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub title: String,
    /// External page for the entry. Always non-empty.
    pub link: String,
    /// Raw `pubDate` text, kept verbatim even when it does not parse as a date.
    pub published_at: String,
    pub description: String,
    pub thumbnail_url: String,
    /// Direct media URL. Empty means there is nothing to play.
    pub video_url: String,
    /// Feed `guid`. May be empty.
    pub id: String,
}

impl VideoRecord {
    pub fn has_video(&self) -> bool {
        !self.video_url.is_empty()
    }
}

#[derive(Debug, Error)]
enum FeedParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document ended with {0} unclosed element(s)")]
    Unclosed(usize),
}

/// Parses feed text into video records in document order.
///
/// Never fails. Text that is not well-formed XML produces an empty vector and
/// a warning in the log.
pub fn parse_feed(raw: &str) -> Vec<VideoRecord> {
    match scan_items(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, bytes = raw.len(), "Feed is not well-formed XML, no records extracted");
            Vec::new()
        }
    }
}

fn scan_items(raw: &str) -> Result<Vec<VideoRecord>, FeedParseError> {
    // Predefined XML entities are resolved by `unescape`; custom entity
    // declarations are never expanded by this quick-xml version.
    let mut reader = NsReader::from_str(raw);

    let mut records = Vec::new();
    let mut open_elements: usize = 0;
    let mut item: Option<ItemScan> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };
        let decoder = reader.decoder();

        match event {
            Event::Start(e) => {
                open_elements += 1;
                match item.as_mut() {
                    Some(scan) => scan.open(&e, namespace, decoder),
                    None if e.name().as_ref() == b"item" => item = Some(ItemScan::default()),
                    None => {}
                }
            }
            Event::Empty(e) => {
                if let Some(scan) = item.as_mut() {
                    scan.leaf(&e, namespace, decoder);
                }
            }
            Event::End(_) => {
                open_elements = open_elements.saturating_sub(1);
                if let Some(scan) = item.as_mut() {
                    if !scan.close() {
                        // The </item> itself
                        records.extend(item.take().and_then(ItemScan::finish));
                    }
                }
            }
            Event::Text(t) => {
                if let Some(scan) = item.as_mut() {
                    match t.unescape() {
                        Ok(text) => scan.push_text(&text),
                        Err(_) => scan.push_text(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(scan) = item.as_mut() {
                    scan.push_text(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if open_elements > 0 {
        return Err(FeedParseError::Unclosed(open_elements));
    }

    tracing::debug!(records = records.len(), "Parsed feed");
    Ok(records)
}

/// Snapshot of one element nested inside an `<item>`.
#[derive(Debug)]
struct ItemElement {
    /// Name as written, prefix included (`media:content`).
    qualified_name: String,
    local_name: String,
    /// Resolved namespace URI, if the element is bound to one.
    namespace: Option<String>,
    /// Value of the `url` attribute, if present.
    url: Option<String>,
    /// 1 for direct children of the item.
    depth: usize,
    /// Concatenated text and CDATA of the element and its descendants.
    text: String,
}

#[derive(Debug, Default)]
struct ItemScan {
    elements: Vec<ItemElement>,
    /// Indices into `elements` of the currently open elements.
    stack: Vec<usize>,
}

impl ItemScan {
    fn open(&mut self, e: &BytesStart<'_>, namespace: Option<String>, decoder: Decoder) {
        self.leaf(e, namespace, decoder);
        self.stack.push(self.elements.len() - 1);
    }

    fn leaf(&mut self, e: &BytesStart<'_>, namespace: Option<String>, decoder: Decoder) {
        let url = e
            .try_get_attribute("url")
            .ok()
            .flatten()
            .map(|attr| {
                attr.decode_and_unescape_value(decoder)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default()
            });

        self.elements.push(ItemElement {
            qualified_name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            namespace,
            url,
            depth: self.stack.len() + 1,
            text: String::new(),
        });
    }

    /// Closes the innermost open element. Returns false when no element inside
    /// the item was open, i.e. the end tag belongs to the item.
    fn close(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    fn push_text(&mut self, text: &str) {
        for &idx in &self.stack {
            self.elements[idx].text.push_str(text);
        }
    }

    fn child_text(&self, name: &str) -> String {
        self.elements
            .iter()
            .find(|e| e.depth == 1 && e.qualified_name == name)
            .map(|e| e.text.trim().to_string())
            .unwrap_or_default()
    }

    fn finish(self) -> Option<VideoRecord> {
        let title = self.child_text("title");
        let link = self.child_text("link");
        if title.is_empty() || link.is_empty() {
            tracing::debug!(
                has_title = !title.is_empty(),
                has_link = !link.is_empty(),
                "Skipping feed item without title or link"
            );
            return None;
        }

        Some(VideoRecord {
            published_at: self.child_text("pubDate"),
            description: self.child_text("description"),
            id: self.child_text("guid"),
            thumbnail_url: first_media_url(&self.elements, "thumbnail", THUMBNAIL_EXTRACTORS),
            video_url: first_media_url(&self.elements, "content", VIDEO_EXTRACTORS),
            title,
            link,
        })
    }
}

// ============================================================================
// Media URL extractor chain
// ============================================================================

/// Looks up the `url` of the first element matching one naming scheme.
///
/// `Some("")` means an element matched but carried no usable `url`; the chain
/// moves on to the next extractor in that case.
type Extractor = for<'a> fn(&'a [ItemElement], &str) -> Option<&'a str>;

const THUMBNAIL_EXTRACTORS: &[Extractor] = &[by_plain_name, by_media_prefix, by_mrss_namespace];

const VIDEO_EXTRACTORS: &[Extractor] = &[
    by_plain_name,
    by_media_prefix,
    by_mrss_namespace,
    by_enclosure,
];

fn first_media_url(elements: &[ItemElement], local_name: &str, chain: &[Extractor]) -> String {
    chain
        .iter()
        .filter_map(|extract| extract(elements, local_name))
        .find(|url| !url.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn first_url<'a>(
    elements: &'a [ItemElement],
    matches: impl Fn(&ItemElement) -> bool,
) -> Option<&'a str> {
    elements
        .iter()
        .find(|&e| matches(e))
        .map(|e| e.url.as_deref().unwrap_or(""))
}

/// `<thumbnail url=…>` with no prefix.
fn by_plain_name<'a>(elements: &'a [ItemElement], local_name: &str) -> Option<&'a str> {
    first_url(elements, |e| e.qualified_name == local_name)
}

/// `<media:thumbnail url=…>` matched on the literal prefix.
fn by_media_prefix<'a>(elements: &'a [ItemElement], local_name: &str) -> Option<&'a str> {
    first_url(elements, |e| {
        e.qualified_name
            .strip_prefix("media:")
            .is_some_and(|rest| rest == local_name)
    })
}

/// Any prefix bound to the MRSS namespace URI.
fn by_mrss_namespace<'a>(elements: &'a [ItemElement], local_name: &str) -> Option<&'a str> {
    first_url(elements, |e| {
        e.namespace.as_deref() == Some(MRSS_NAMESPACE) && e.local_name == local_name
    })
}

/// RSS `<enclosure url=…>`, regardless of the media name being looked up.
fn by_enclosure<'a>(elements: &'a [ItemElement], _local_name: &str) -> Option<&'a str> {
    first_url(elements, |e| e.qualified_name == "enclosure")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rss(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
<channel><title>Collection</title>{}</channel></rss>"#,
            items
        )
    }

    #[test]
    fn test_full_item() {
        let xml = rss(r#"
<item>
  <title>Quick Look: Example</title>
  <link>https://archive.org/details/example</link>
  <pubDate>Tue, 10 Jun 2003 04:00:00 GMT</pubDate>
  <description>A description</description>
  <guid>https://archive.org/details/example</guid>
  <media:thumbnail url="https://archive.org/services/img/example"/>
  <media:content url="https://archive.org/download/example/example.mp4" type="video/mp4"/>
</item>"#);

        let records = parse_feed(&xml);
        assert_eq!(
            records,
            vec![VideoRecord {
                title: "Quick Look: Example".into(),
                link: "https://archive.org/details/example".into(),
                published_at: "Tue, 10 Jun 2003 04:00:00 GMT".into(),
                description: "A description".into(),
                thumbnail_url: "https://archive.org/services/img/example".into(),
                video_url: "https://archive.org/download/example/example.mp4".into(),
                id: "https://archive.org/details/example".into(),
            }]
        );
        assert!(records[0].has_video());
    }

    #[test]
    fn test_items_without_title_or_link_are_excluded() {
        let xml = rss(r#"
<item><title>No link</title></item>
<item><link>https://example.com/no-title</link></item>
<item><title>   </title><link>https://example.com/blank-title</link></item>
<item><title>Kept</title><link>https://example.com/kept</link></item>"#);

        let records = parse_feed(&xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
        assert_eq!(records[0].video_url, "");
        assert_eq!(records[0].thumbnail_url, "");
        assert_eq!(records[0].published_at, "");
        assert_eq!(records[0].id, "");
    }

    #[test]
    fn test_document_order_preserved() {
        let xml = rss(r#"
<item><title>C</title><link>https://e.com/c</link><pubDate>2001</pubDate></item>
<item><title>A</title><link>https://e.com/a</link><pubDate>2003</pubDate></item>
<item><title>B</title><link>https://e.com/b</link><pubDate>2002</pubDate></item>"#);

        let titles: Vec<_> = parse_feed(&xml).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_media_content_only() {
        let xml = rss(r#"
<item><title>T</title><link>https://e.com/t</link>
<media:content url="https://e.com/t.mp4"/></item>"#);

        assert_eq!(parse_feed(&xml)[0].video_url, "https://e.com/t.mp4");
    }

    #[test]
    fn test_enclosure_fallback() {
        let xml = rss(r#"
<item><title>T</title><link>https://e.com/t</link>
<enclosure url="https://e.com/t.ogv" length="1" type="video/ogg"/></item>"#);

        assert_eq!(parse_feed(&xml)[0].video_url, "https://e.com/t.ogv");
    }

    #[test]
    fn test_plain_thumbnail_wins_over_prefixed() {
        let xml = rss(r#"
<item><title>T</title><link>https://e.com/t</link>
<media:thumbnail url="https://e.com/media.jpg"/>
<thumbnail url="https://e.com/plain.jpg"/></item>"#);

        assert_eq!(parse_feed(&xml)[0].thumbnail_url, "https://e.com/plain.jpg");
    }

    #[test]
    fn test_empty_url_falls_through_to_next_extractor() {
        let xml = rss(r#"
<item><title>T</title><link>https://e.com/t</link>
<content url=""/>
<media:content url="https://e.com/media.mp4"/>
<enclosure url="https://e.com/enclosure.mp4"/></item>"#);

        assert_eq!(parse_feed(&xml)[0].video_url, "https://e.com/media.mp4");
    }

    #[test]
    fn test_namespace_bound_to_other_prefix() {
        let xml = r#"<rss version="2.0" xmlns:m="http://search.yahoo.com/mrss/"><channel>
<item><title>T</title><link>https://e.com/t</link>
<m:group>
  <m:content url="https://e.com/grouped.mp4"/>
  <m:thumbnail url="https://e.com/grouped.jpg"/>
</m:group>
</item></channel></rss>"#;

        let record = &parse_feed(xml)[0];
        assert_eq!(record.video_url, "https://e.com/grouped.mp4");
        assert_eq!(record.thumbnail_url, "https://e.com/grouped.jpg");
    }

    #[test]
    fn test_undeclared_media_prefix_matched_by_name() {
        // No xmlns:media declaration, so only the literal name can match
        let xml = r#"<rss><channel><item><title>T</title><link>https://e.com/t</link>
<media:thumbnail url="https://e.com/t.jpg"/>
<media:content url="https://e.com/t.mp4"/></item></channel></rss>"#;

        let record = &parse_feed(xml)[0];
        assert_eq!(record.thumbnail_url, "https://e.com/t.jpg");
        assert_eq!(record.video_url, "https://e.com/t.mp4");
    }

    #[test]
    fn test_cdata_and_entities() {
        let xml = rss(r#"
<item><title>Tom &amp; Jerry</title><link>https://e.com/t?a=1&amp;b=2</link>
<description><![CDATA[<p>Bold <b>claims</b></p>]]></description>
<enclosure url="https://e.com/t.mp4?x=1&amp;y=2"/></item>"#);

        let record = &parse_feed(&xml)[0];
        assert_eq!(record.title, "Tom & Jerry");
        assert_eq!(record.link, "https://e.com/t?a=1&b=2");
        assert_eq!(record.description, "<p>Bold <b>claims</b></p>");
        assert_eq!(record.video_url, "https://e.com/t.mp4?x=1&y=2");
    }

    #[test]
    fn test_malformed_date_preserved() {
        let xml = rss(r#"
<item><title>T</title><link>https://e.com/t</link><pubDate>sometime in 2009</pubDate></item>"#);

        assert_eq!(parse_feed(&xml)[0].published_at, "sometime in 2009");
    }

    #[test]
    fn test_nested_title_does_not_shadow_item_title() {
        let xml = rss(r#"
<item>
  <media:group><media:title>Nested</media:title><title>Deep</title></media:group>
  <title>Outer</title><link>https://e.com/t</link>
</item>"#);

        assert_eq!(parse_feed(&xml)[0].title, "Outer");
    }

    #[test]
    fn test_not_xml_yields_empty() {
        assert!(parse_feed("<not valid xml").is_empty());
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("<html><body>Service unavailable</body></html>").is_empty());
        assert!(parse_feed("<rss><channel><item><title>T</title></channel></rss>").is_empty());
    }

    #[test]
    fn test_truncated_document_yields_empty() {
        let xml = rss(r#"<item><title>T</title><link>https://e.com/t</link></item>"#);
        let truncated = &xml[..xml.len() - "</channel></rss>".len()];
        assert!(parse_feed(truncated).is_empty());
    }

    #[test]
    fn test_repeated_parse_returns_fresh_results() {
        let xml = rss(r#"<item><title>T</title><link>https://e.com/t</link></item>"#);
        let mut first = parse_feed(&xml);
        first.clear();
        assert_eq!(parse_feed(&xml).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_never_panics(input in "\\PC*") {
            let _ = parse_feed(&input);
        }

        #[test]
        fn prop_inclusion_iff_title_and_link(
            items in prop::collection::vec((any::<bool>(), any::<bool>(), "[a-z]{1,8}"), 0..30)
        ) {
            let body: String = items
                .iter()
                .map(|(has_title, has_link, name)| {
                    let mut item = String::from("<item>");
                    if *has_title {
                        item.push_str(&format!("<title>{}</title>", name));
                    }
                    if *has_link {
                        item.push_str(&format!("<link>https://e.com/{}</link>", name));
                    }
                    item.push_str("<guid>g</guid></item>");
                    item
                })
                .collect();

            let expected: Vec<String> = items
                .iter()
                .filter(|(t, l, _)| *t && *l)
                .map(|(_, _, name)| name.clone())
                .collect();

            let titles: Vec<String> = parse_feed(&rss(&body)).into_iter().map(|r| r.title).collect();
            prop_assert_eq!(titles, expected);
        }
    }
}
