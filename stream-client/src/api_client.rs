use anyhow::{Context, Result};
use domain::{ArticleSummary, Locale};
use reqwest::Client;

/// Thin REST client for the read-side listing endpoints.
///
/// Hydration and stream payloads share the `ArticleSummary` shape, so
/// records fetched here merge into the same cache the stream feeds.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Fetches the newest published articles for one locale.
    pub async fn latest_articles(&self, locale: Locale, limit: usize) -> Result<Vec<ArticleSummary>> {
        let url = format!("{}/articles/latest", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("locale", locale.as_str()), ("limit", &limit.to_string())])
            .send()
            .await
            .context("Failed to fetch latest articles")?;

        if !response.status().is_success() {
            anyhow::bail!("Latest articles request failed: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse latest articles response")
    }

    /// Fetches every published article for one locale.
    pub async fn list_articles(&self, locale: Locale) -> Result<Vec<ArticleSummary>> {
        let url = format!("{}/articles", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("locale", locale.as_str())])
            .send()
            .await
            .context("Failed to fetch article listing")?;

        if !response.status().is_success() {
            anyhow::bail!("Article listing request failed: {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse article listing response")
    }
}
