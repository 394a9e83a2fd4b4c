use chrono::{DateTime, Utc};
use serde::Serialize;

/// Canonical news item. `link` is the identity key in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Display string as published by the feed.
    pub published: String,
    /// Sort key only, never exported.
    #[serde(skip)]
    pub pub_date: DateTime<Utc>,
    pub summary: String,
    pub source: String,
    pub image_url: Option<String>,
}

/// An article as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArticle {
    pub id: i64,
    pub article: Article,
}
