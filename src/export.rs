use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::Article;

/// The `news.json` document consumed by the static front end.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsExport<'a> {
    pub articles: &'a [Article],
    pub last_updated: String,
    pub total_articles: usize,
}

impl<'a> NewsExport<'a> {
    pub fn new(articles: &'a [Article], now: DateTime<Utc>) -> Self {
        Self {
            articles,
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_articles: articles.len(),
        }
    }
}

pub fn write_export(path: &Path, articles: &[Article]) -> Result<()> {
    let export = NewsExport::new(articles, Utc::now());
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    tracing::info!("Generated {} with {} articles", path.display(), articles.len());
    Ok(())
}
