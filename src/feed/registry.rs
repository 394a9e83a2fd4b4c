use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::images::PageProfile;

/// A feed entry in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub feed_url: String,
    pub name: String,
    /// Present only for sources whose feeds omit images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_profile: Option<PageProfile>,
}

pub fn default_sources() -> Vec<SourceConfig> {
    [
        ("https://www.theverge.com/rss/index.xml", "The Verge", None),
        (
            "https://www.theregister.com/headlines.atom",
            "The Register",
            Some(PageProfile::ArticleBody),
        ),
        (
            "https://techcrunch.com/feed/",
            "TechCrunch",
            Some(PageProfile::FeaturedImage),
        ),
        ("https://feeds.arstechnica.com/arstechnica/index", "Ars Technica", None),
        ("https://www.wired.com/feed/rss", "Wired", None),
    ]
    .into_iter()
    .map(|(feed_url, name, page_profile)| SourceConfig {
        feed_url: feed_url.to_string(),
        name: name.to_string(),
        page_profile,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub feed_url: String,
    pub name: String,
    pub page_profile: Option<PageProfile>,
}

/// Validated, read-only list of sources in processing order.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn from_config(configs: &[SourceConfig]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(configs.len());

        for config in configs {
            let name = config.name.trim();
            if name.is_empty() {
                return Err(AppError::Config(format!(
                    "source {} has an empty name",
                    config.feed_url
                )));
            }
            Url::parse(&config.feed_url).map_err(|e| {
                AppError::Config(format!("invalid feed url {}: {}", config.feed_url, e))
            })?;
            if !seen.insert(config.feed_url.clone()) {
                return Err(AppError::Config(format!(
                    "duplicate feed url {}",
                    config.feed_url
                )));
            }

            sources.push(Source {
                feed_url: config.feed_url.clone(),
                name: name.to_string(),
                page_profile: config.page_profile,
            });
        }

        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order_and_flags() {
        let registry = SourceRegistry::from_config(&default_sources()).unwrap();
        let names: Vec<_> = registry.sources().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["The Verge", "The Register", "TechCrunch", "Ars Technica", "Wired"]
        );

        let fetching: Vec<_> = registry
            .sources()
            .iter()
            .filter(|s| s.page_profile.is_some())
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(fetching, ["The Register", "TechCrunch"]);
    }

    #[test]
    fn test_rejects_duplicate_feed_url() {
        let mut configs = default_sources();
        configs.push(configs[0].clone());
        assert!(matches!(
            SourceRegistry::from_config(&configs),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_bad_url_and_blank_name() {
        let bad_url = [SourceConfig {
            feed_url: "not a url".to_string(),
            name: "X".to_string(),
            page_profile: None,
        }];
        assert!(SourceRegistry::from_config(&bad_url).is_err());

        let blank = [SourceConfig {
            feed_url: "https://example.com/feed".to_string(),
            name: "  ".to_string(),
            page_profile: None,
        }];
        assert!(SourceRegistry::from_config(&blank).is_err());
    }
}
