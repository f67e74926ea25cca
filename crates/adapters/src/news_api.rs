//! NewsAPI adapter - structured keyword search over recent articles

use async_trait::async_trait;
use news_digest_domain::{NewsItem, NewsSource, SourceError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use time::macros::format_description;
use time::{Duration as TimeSpan, OffsetDateTime};

/// Maximum items this source contributes to a run
pub const MAX_ITEMS: usize = 5;

/// Search parameters for the NewsAPI `everything` endpoint
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    /// Keyword expression
    pub query: String,
    pub language: String,
    pub page_size: u32,
    /// Only articles newer than this many days
    pub lookback_days: i64,
    pub timeout_secs: u64,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            query: r#"Canada immigration OR "Canadian immigration" OR "immigrate to Canada" OR IRCC"#
                .to_string(),
            language: "en".to_string(),
            page_size: 10,
            lookback_days: 7,
            timeout_secs: 10,
        }
    }
}

/// News source backed by the NewsAPI search endpoint
pub struct NewsApiSource {
    client: Client,
    api_key: SecretString,
    config: NewsApiConfig,
}

impl NewsApiSource {
    pub fn new(api_key: SecretString, config: NewsApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            config,
        }
    }

    fn from_date(&self) -> String {
        let since = OffsetDateTime::now_utc() - TimeSpan::days(self.config.lookback_days);
        since
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
    description: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl Article {
    fn into_news_item(self) -> Option<NewsItem> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let url = self.url.filter(|u| !u.trim().is_empty())?;

        Some(NewsItem {
            title,
            url,
            source: self
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            description: self.description.unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
            image: self.url_to_image,
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "news_api"
    }

    async fn fetch(&self) -> Result<Vec<NewsItem>, SourceError> {
        let url = format!("{}/v2/everything", self.config.base_url);
        let page_size = self.config.page_size.to_string();
        let from = self.from_date();

        tracing::debug!(from = %from, query = %self.config.query, "Searching NewsAPI");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.expose_secret()),
                ("q", self.config.query.as_str()),
                ("language", self.config.language.as_str()),
                ("sortBy", "publishedAt"),
                ("from", from.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(format!(
                "NewsAPI returned {}: {}",
                status, body
            )));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidFormat(e.to_string()))?;

        let items: Vec<NewsItem> = body
            .articles
            .into_iter()
            .filter_map(Article::into_news_item)
            .take(MAX_ITEMS)
            .collect();

        Ok(items)
    }
}
