use std::time::Duration;

use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Enclosure, MediaAttachment, RawEntry};

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<RawEntry>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        parse_feed(&bytes[..])
    }
}

/// Parse an RSS or Atom document into raw entries, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>> {
    let feed = parser::parse(bytes)?;
    Ok(feed.entries.into_iter().map(raw_entry).collect())
}

fn raw_entry(entry: Entry) -> RawEntry {
    let mut media_content = Vec::new();
    let mut media_thumbnails = Vec::new();

    for media in &entry.media {
        for content in &media.content {
            if let Some(url) = &content.url {
                media_content.push(MediaAttachment {
                    url: url.to_string(),
                    mime_type: content.content_type.as_ref().map(|m| m.to_string()),
                    width: content.width,
                });
            }
        }
        for thumbnail in &media.thumbnails {
            let uri = thumbnail.image.uri.trim();
            if !uri.is_empty() {
                media_thumbnails.push(uri.to_string());
            }
        }
    }

    let enclosures = entry
        .links
        .iter()
        .filter(|l| l.rel.as_deref() == Some("enclosure"))
        .map(|l| Enclosure {
            href: l.href.clone(),
            mime_type: l.media_type.clone(),
        })
        .collect();

    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .into_iter()
        .collect();

    RawEntry {
        title: entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string()),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        published: entry.published.or(entry.updated).map(|dt| dt.to_rfc2822()),
        summary: entry.summary.map(|s| s.content),
        media_content,
        media_thumbnails,
        enclosures,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:media="http://search.yahoo.com/mrss/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Example Tech</title>
    <link>https://example.com/</link>
    <description>Example</description>
    <item>
      <title>Chip shortage eases</title>
      <link>https://example.com/chips</link>
      <pubDate>Tue, 14 Jan 2025 10:30:00 +0000</pubDate>
      <description><![CDATA[<p>Supply is <b>recovering</b>.</p>]]></description>
      <content:encoded><![CDATA[<p><img src="/img/chips.jpg" width="640"></p>]]></content:encoded>
      <media:content url="https://cdn.example.com/chips-large.jpg" type="image/jpeg" width="1200" height="800"/>
      <media:thumbnail url="https://cdn.example.com/chips-thumb.jpg"/>
    </item>
    <item>
      <title>No frills</title>
      <link>https://example.com/plain</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <id>urn:example:feed</id>
  <updated>2025-01-14T10:30:00Z</updated>
  <entry>
    <title>Kernel release</title>
    <id>urn:example:kernel</id>
    <link href="https://example.org/kernel"/>
    <link rel="enclosure" type="image/png" href="https://example.org/kernel.png"/>
    <updated>2025-01-14T09:00:00Z</updated>
    <summary>New scheduler lands.</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_entry() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let entry = &entries[0];
        assert_eq!(entry.title, "Chip shortage eases");
        assert_eq!(entry.link, "https://example.com/chips");
        assert!(entry
            .summary
            .as_deref()
            .unwrap()
            .contains("<b>recovering</b>"));
        assert_eq!(entry.content.len(), 1);
        assert!(entry.content[0].contains("/img/chips.jpg"));

        let large = entry
            .media_content
            .iter()
            .find(|m| m.url == "https://cdn.example.com/chips-large.jpg")
            .unwrap();
        assert!(large.is_image());
        assert_eq!(large.width, Some(1200));
        assert!(entry
            .media_thumbnails
            .contains(&"https://cdn.example.com/chips-thumb.jpg".to_string()));

        let published = entry.published.as_deref().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc2822(published).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-01-14T10:30:00+00:00");
    }

    #[test]
    fn test_parse_rss_entry_without_optional_fields() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        let entry = &entries[1];
        assert_eq!(entry.title, "No frills");
        assert_eq!(entry.published, None);
        assert_eq!(entry.summary, None);
        assert!(entry.media_content.is_empty());
        assert!(entry.content.is_empty());
    }

    #[test]
    fn test_parse_atom_enclosure_and_updated_fallback() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.link, "https://example.org/kernel");
        assert_eq!(entry.summary.as_deref(), Some("New scheduler lands."));
        assert_eq!(
            entry.enclosures,
            vec![Enclosure {
                href: "https://example.org/kernel.png".to_string(),
                mime_type: Some("image/png".to_string()),
            }]
        );
        assert!(entry.published.is_some());
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_feed(b"<html><body>not a feed</body></html>").is_err());
    }
}
