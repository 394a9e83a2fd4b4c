use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::declared_width;

/// How to find the lead image on a source's article pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageProfile {
    /// `og:image`, then a featured-image container.
    FeaturedImage,
    /// `og:image` unless it is an ad, then the article body.
    ArticleBody,
    /// `og:image`, then the first wide image anywhere.
    Generic,
}

const LARGE_IMAGE_WIDTH: u32 = 300;
const AD_HOSTS: [&str; 2] = ["doubleclick.net", "amazon-adsystem"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:image"]"#));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static FEATURED_CONTAINERS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        selector("div.article__featured-image"),
        selector("div.featured-image"),
        selector(r#"div[data-attribute="article-featured-image"]"#),
    ]
});
static ARTICLE_BODY: LazyLock<Selector> = LazyLock::new(|| selector("div#body"));

impl PageProfile {
    /// Pick the lead image URL out of `html`. URLs are returned as found.
    pub fn extract(self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        match self {
            PageProfile::FeaturedImage => featured_image(&document),
            PageProfile::ArticleBody => article_body_image(&document),
            PageProfile::Generic => generic_image(&document),
        }
    }
}

fn og_image(document: &Html) -> Option<String> {
    document
        .select(&OG_IMAGE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn is_ad(url: &str) -> bool {
    AD_HOSTS.iter().any(|host| url.contains(host))
}

fn is_large(img: &ElementRef<'_>) -> bool {
    declared_width(img.value().attr("width")).is_some_and(|w| w > LARGE_IMAGE_WIDTH)
}

fn featured_image(document: &Html) -> Option<String> {
    if let Some(url) = og_image(document) {
        return Some(url);
    }

    let container = FEATURED_CONTAINERS
        .iter()
        .find_map(|sel| document.select(sel).next())?;
    container
        .select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

fn article_body_image(document: &Html) -> Option<String> {
    if let Some(url) = og_image(document).filter(|url| !is_ad(url)) {
        return Some(url);
    }

    let body = document.select(&ARTICLE_BODY).next()?;
    for img in body.select(&IMG) {
        let Some(src) = img.value().attr("src").filter(|s| !s.is_empty()) else {
            continue;
        };
        if is_ad(src) {
            continue;
        }
        // An empty width counts as undeclared.
        let width = img.value().attr("width").filter(|w| !w.is_empty());
        if is_large(&img) || width.is_none() {
            return Some(src.to_string());
        }
    }
    None
}

fn generic_image(document: &Html) -> Option<String> {
    if let Some(url) = og_image(document) {
        return Some(url);
    }

    document.select(&IMG).find_map(|img| {
        let element = img.value();
        let src = element
            .attr("src")
            .filter(|s| !s.is_empty())
            .or_else(|| element.attr("data-src"))
            .filter(|s| !s.is_empty())?;
        is_large(&img).then(|| src.to_string())
    })
}
