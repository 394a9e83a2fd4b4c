use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::Result;

/// Fetches article pages for sources whose feeds carry no images.
pub struct PageFetcher {
    client: Client,
    user_agent: String,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            user_agent: user_agent.to_string(),
        }
    }

    /// Returns `Ok(None)` for non-HTTP links and non-success responses.
    pub async fn fetch_html(&self, article_url: &str) -> Result<Option<String>> {
        let url = Url::parse(article_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(None);
        }

        let mut headers = HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let response = self.client.get(url).headers(headers).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: {}", article_url, response.status());
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}
