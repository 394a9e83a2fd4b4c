mod filter;
mod normalize;

pub use filter::parse_published;

use filter::{ContentFilter, Verdict};
use normalize::normalize;

use std::time::Duration;

use chrono::Utc;

use crate::config::Config;
use crate::feed::{FeedFetcher, Source, SourceRegistry};
use crate::images::ImageResolver;
use crate::models::{Article, RawEntry};
use crate::services::PageFetcher;

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub per_source_limit: usize,
    pub max_articles: usize,
    pub retention: chrono::Duration,
    pub pacing: Duration,
}

impl From<&Config> for IngestSettings {
    fn from(config: &Config) -> Self {
        Self {
            per_source_limit: config.per_source_limit,
            max_articles: config.max_articles,
            retention: config.retention(),
            pacing: config.pacing(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IngestReport {
    /// Newest first, capped at `max_articles`.
    pub articles: Vec<Article>,
    /// Accepted entries per source, in registry order.
    pub per_source: Vec<(String, usize)>,
}

pub struct Pipeline {
    registry: SourceRegistry,
    fetcher: FeedFetcher,
    resolver: ImageResolver,
    settings: IngestSettings,
}

impl Pipeline {
    pub fn new(
        registry: SourceRegistry,
        fetcher: FeedFetcher,
        resolver: ImageResolver,
        settings: IngestSettings,
    ) -> Self {
        Self {
            registry,
            fetcher,
            resolver,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let registry = SourceRegistry::from_config(&config.sources)?;
        let fetcher = FeedFetcher::new(&config.user_agent, config.request_timeout());
        let resolver = ImageResolver::new(PageFetcher::new(
            &config.user_agent,
            config.request_timeout(),
        ));
        Ok(Self::new(registry, fetcher, resolver, config.into()))
    }

    pub async fn run(&self) -> IngestReport {
        let mut articles = Vec::new();
        let mut per_source = Vec::with_capacity(self.registry.sources().len());

        for source in self.registry.sources() {
            tracing::info!("Fetching from {}...", source.name);

            // A failed source contributes nothing; the run goes on.
            let entries = match self.fetcher.fetch_feed(&source.feed_url).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Error fetching {}: {}", source.feed_url, e);
                    Vec::new()
                }
            };

            let accepted = self.process_source(source, entries).await;
            per_source.push((source.name.clone(), accepted.len()));
            articles.extend(accepted);
        }

        let articles = self.finish(articles);

        tracing::info!("Total articles fetched: {}", articles.len());

        IngestReport {
            articles,
            per_source,
        }
    }

    /// Filter and normalize one source's entries, up to the per-source limit.
    pub async fn process_source(&self, source: &Source, entries: Vec<RawEntry>) -> Vec<Article> {
        let now = Utc::now();
        let filter = ContentFilter::new(now, self.settings.retention);
        let mut accepted = Vec::new();

        for entry in entries {
            if accepted.len() >= self.settings.per_source_limit {
                break;
            }

            let pub_date = parse_published(entry.published.as_deref(), now);
            let summary = entry.summary.as_deref().unwrap_or_default();

            match filter.check(&entry.title, summary, pub_date) {
                Verdict::Keep => {}
                Verdict::Stale => {
                    tracing::info!("Skipping old article: {}", entry.title);
                    continue;
                }
                Verdict::Promotional => {
                    tracing::info!("Filtered out article: {}", entry.title);
                    continue;
                }
            }

            let image_url = self.resolver.resolve(&entry, source).await;
            accepted.push(normalize(&entry, &source.name, image_url, pub_date, now));

            if !self.settings.pacing.is_zero() {
                tokio::time::sleep(self.settings.pacing).await;
            }
        }

        accepted
    }

    fn finish(&self, mut articles: Vec<Article>) -> Vec<Article> {
        articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        articles.truncate(self.settings.max_articles);
        articles
    }
}
