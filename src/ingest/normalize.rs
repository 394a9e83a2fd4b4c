use chrono::{DateTime, Utc};
use scraper::Html;

use crate::models::{Article, RawEntry};

pub const SUMMARY_MAX_CHARS: usize = 300;
const ELLIPSIS: &str = "...";
const PUBLISHED_FALLBACK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the canonical article for an entry that passed filtering.
pub fn normalize(
    entry: &RawEntry,
    source: &str,
    image_url: Option<String>,
    pub_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Article {
    let published = entry
        .published
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| now.format(PUBLISHED_FALLBACK_FORMAT).to_string());

    Article {
        title: entry.title.clone(),
        link: entry.link.clone(),
        published,
        pub_date,
        summary: clean_summary(entry.summary.as_deref()),
        source: source.to_string(),
        image_url,
    }
}

/// Strip markup and cap the length at [`SUMMARY_MAX_CHARS`].
pub fn clean_summary(summary: Option<&str>) -> String {
    let Some(html) = summary.filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let text: String = Html::parse_fragment(html).root_element().text().collect();

    if text.chars().count() > SUMMARY_MAX_CHARS {
        let mut truncated: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        text
    }
}
