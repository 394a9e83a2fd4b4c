use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::{absolutize, declared_width};
use crate::models::RawEntry;

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

/// Width above which a media attachment is preferred.
const LARGE_MEDIA_WIDTH: u32 = 300;
/// Inline images narrower than this are treated as placeholders.
const PLACEHOLDER_WIDTH: u32 = 50;

/// Read-only view of an entry plus the base URL for relative links.
pub struct EntryView<'a> {
    pub entry: &'a RawEntry,
    pub base: Option<&'a Url>,
}

type Strategy = fn(&EntryView<'_>, &mut HashSet<String>) -> Option<String>;

/// Tried in order; the first hit wins.
const STRATEGIES: [(&str, Strategy); 5] = [
    ("media content", from_media_content),
    ("media thumbnail", from_media_thumbnails),
    ("enclosure", from_enclosures),
    ("content html", from_content_blocks),
    ("summary html", from_summary),
];

/// Run the feed-only strategies against `entry`, resolving relative
/// URLs against `feed_url`.
pub fn resolve_from_feed(entry: &RawEntry, feed_url: &str) -> Option<String> {
    let base = Url::parse(feed_url).ok();
    let view = EntryView {
        entry,
        base: base.as_ref(),
    };
    let mut seen = HashSet::new();

    STRATEGIES.iter().find_map(|&(name, strategy)| {
        let found = strategy(&view, &mut seen);
        if let Some(url) = &found {
            tracing::debug!(strategy = name, %url, "image found");
        }
        found
    })
}

fn from_media_content(view: &EntryView<'_>, seen: &mut HashSet<String>) -> Option<String> {
    let mut chosen: Option<&str> = None;

    for media in view.entry.media_content.iter().filter(|m| m.is_image()) {
        if media.url.is_empty() || !seen.insert(media.url.clone()) {
            continue;
        }
        let large = media.width.is_some_and(|w| w > LARGE_MEDIA_WIDTH);
        if chosen.is_none() || large {
            chosen = Some(media.url.as_str());
        }
    }

    chosen.map(str::to_string)
}

fn from_media_thumbnails(view: &EntryView<'_>, seen: &mut HashSet<String>) -> Option<String> {
    view.entry
        .media_thumbnails
        .iter()
        .find(|url| !url.is_empty() && seen.insert((*url).clone()))
        .cloned()
}

fn from_enclosures(view: &EntryView<'_>, seen: &mut HashSet<String>) -> Option<String> {
    view.entry
        .enclosures
        .iter()
        .filter(|e| e.is_image())
        .find(|e| !e.href.is_empty() && seen.insert(e.href.clone()))
        .map(|e| e.href.clone())
}

fn from_content_blocks(view: &EntryView<'_>, seen: &mut HashSet<String>) -> Option<String> {
    view.entry
        .content
        .iter()
        .find_map(|block| first_inline_image(block, view.base, seen))
}

fn from_summary(view: &EntryView<'_>, seen: &mut HashSet<String>) -> Option<String> {
    let summary = view.entry.summary.as_deref()?;
    first_inline_image(summary, view.base, seen)
}

/// First `<img>` in `html` that is neither already seen nor a placeholder.
fn first_inline_image(
    html: &str,
    base: Option<&Url>,
    seen: &mut HashSet<String>,
) -> Option<String> {
    let fragment = Html::parse_fragment(html);

    for img in fragment.select(&IMG) {
        let element = img.value();
        let Some(src) = element
            .attr("src")
            .filter(|s| !s.is_empty())
            .or_else(|| element.attr("data-src"))
            .filter(|s| !s.is_empty())
        else {
            continue;
        };

        let full_url = absolutize(src, base);
        if !seen.insert(full_url.clone()) {
            continue;
        }
        if declared_width(element.attr("width")).is_some_and(|w| w < PLACEHOLDER_WIDTH) {
            continue;
        }
        return Some(full_url);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Enclosure, MediaAttachment};

    const FEED: &str = "https://news.example.com/rss/index.xml";

    fn media(url: &str, mime: Option<&str>, width: Option<u32>) -> MediaAttachment {
        MediaAttachment {
            url: url.to_string(),
            mime_type: mime.map(str::to_string),
            width,
        }
    }

    #[test]
    fn test_wide_media_beats_inline_summary_image() {
        let entry = RawEntry {
            media_content: vec![media("a.jpg", Some("image/jpeg"), Some(400))],
            summary: Some(r#"<p><img src="b.jpg"></p>"#.to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_from_feed(&entry, FEED).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_media_prefers_wide_candidate_over_first() {
        let entry = RawEntry {
            media_content: vec![
                media("https://cdn.example.com/small.jpg", Some("image/jpeg"), None),
                media("https://cdn.example.com/video.mp4", Some("video/mp4"), Some(1920)),
                media("https://cdn.example.com/large.jpg", Some("image/jpeg"), Some(800)),
            ],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/large.jpg")
        );
    }

    #[test]
    fn test_media_without_wide_candidate_keeps_first() {
        let entry = RawEntry {
            media_content: vec![
                media("https://cdn.example.com/one.jpg", Some("image/jpeg"), Some(200)),
                media("https://cdn.example.com/two.jpg", Some("image/jpeg"), Some(250)),
            ],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/one.jpg")
        );
    }

    #[test]
    fn test_untyped_media_falls_through_to_thumbnail() {
        let entry = RawEntry {
            media_content: vec![media("https://cdn.example.com/x", None, Some(900))],
            media_thumbnails: vec!["https://cdn.example.com/thumb.jpg".to_string()],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/thumb.jpg")
        );
    }

    #[test]
    fn test_enclosure_must_be_image() {
        let entry = RawEntry {
            enclosures: vec![
                Enclosure {
                    href: "https://cdn.example.com/ep.mp3".to_string(),
                    mime_type: Some("audio/mpeg".to_string()),
                },
                Enclosure {
                    href: "https://cdn.example.com/cover.png".to_string(),
                    mime_type: Some("image/png".to_string()),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/cover.png")
        );
    }

    #[test]
    fn test_content_skips_placeholders_and_resolves_relative() {
        let entry = RawEntry {
            content: vec![r#"<img src="/pixel.gif" width="1"><img data-src="/hero.jpg" width="640">"#
                .to_string()],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://news.example.com/hero.jpg")
        );
    }

    #[test]
    fn test_non_numeric_width_is_not_a_placeholder() {
        let entry = RawEntry {
            content: vec![r#"<img src="https://cdn.example.com/a.jpg" width="10px">"#.to_string()],
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn test_summary_skips_url_seen_in_content() {
        let entry = RawEntry {
            content: vec![r#"<img src="https://cdn.example.com/tiny.png" width="16">"#.to_string()],
            summary: Some(
                r#"<img src="https://cdn.example.com/tiny.png"><img src="https://cdn.example.com/real.png">"#
                    .to_string(),
            ),
            ..Default::default()
        };
        assert_eq!(
            resolve_from_feed(&entry, FEED).as_deref(),
            Some("https://cdn.example.com/real.png")
        );
    }

    #[test]
    fn test_nothing_found() {
        let entry = RawEntry {
            summary: Some("<p>text only</p>".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_from_feed(&entry, FEED), None);
    }
}
