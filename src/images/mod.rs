mod feed;
mod page;

pub use feed::resolve_from_feed;
pub use page::PageProfile;

use url::Url;

use crate::feed::Source;
use crate::models::RawEntry;
use crate::services::PageFetcher;

pub struct ImageResolver {
    pages: PageFetcher,
}

impl ImageResolver {
    pub fn new(pages: PageFetcher) -> Self {
        Self { pages }
    }

    pub async fn resolve(&self, entry: &RawEntry, source: &Source) -> Option<String> {
        // Only flagged sources are worth a page fetch.
        let found = match resolve_from_feed(entry, &source.feed_url) {
            Some(url) => Some(url),
            None => match source.page_profile {
                Some(profile) => self.resolve_from_page(&entry.link, profile).await,
                None => None,
            },
        };
        found.map(|url| https_if_protocol_relative(&url))
    }

    async fn resolve_from_page(&self, article_url: &str, profile: PageProfile) -> Option<String> {
        tracing::debug!("Fetching article page for image: {}", article_url);

        let html = match self.pages.fetch_html(article_url).await {
            Ok(Some(html)) => html,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Error fetching article image from page {}: {}", article_url, e);
                return None;
            }
        };

        let base = Url::parse(article_url).ok();
        profile
            .extract(&html)
            .map(|src| absolutize(&src, base.as_ref()))
    }
}

/// Rewrite `//host/path` to `https://host/path`.
pub fn https_if_protocol_relative(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Resolve `src` against `base`, keeping it unchanged when that fails.
fn absolutize(src: &str, base: Option<&Url>) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    match base.and_then(|b| b.join(src).ok()) {
        Some(url) => url.to_string(),
        // `//host/path` with nothing to inherit a scheme from
        None => https_if_protocol_relative(src),
    }
}

/// A `width` attribute counts only when it is all ASCII digits.
fn declared_width(attr: Option<&str>) -> Option<u32> {
    attr.filter(|w| !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|w| w.parse().ok())
}
