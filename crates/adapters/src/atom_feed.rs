//! Atom/RSS feed adapter for official news feeds

use async_trait::async_trait;
use news_digest_domain::{NewsItem, NewsSource, SourceError};
use reqwest::Client;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Maximum items this source contributes to a run
pub const MAX_ITEMS: usize = 5;

/// Feed endpoint and attribution
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Value used for the `source` field of every item
    pub source_name: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://www.canada.ca/en/immigration-refugees-citizenship/news.atom.xml"
                .to_string(),
            source_name: "IRCC Official".to_string(),
            timeout_secs: 10,
        }
    }
}

/// News source reading a single Atom or RSS feed
pub struct AtomFeedSource {
    client: Client,
    config: FeedConfig,
}

impl AtomFeedSource {
    pub fn new(config: FeedConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Parse a feed document into news items.
    ///
    /// Entries without a title or link are skipped, the rest are kept.
    pub fn parse_items(&self, body: &[u8]) -> Result<Vec<NewsItem>, SourceError> {
        let feed = feed_rs::parser::parse(body)
            .map_err(|e| SourceError::InvalidFormat(format!("Failed to parse feed: {}", e)))?;

        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let items: Vec<NewsItem> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let title = entry
                    .title
                    .map(|t| t.content.trim().to_string())
                    .filter(|t| !t.is_empty());
                let url = entry
                    .links
                    .first()
                    .map(|l| l.href.trim().to_string())
                    .filter(|u| !u.is_empty());

                let (Some(title), Some(url)) = (title, url) else {
                    tracing::debug!(
                        entry_id = %entry.id,
                        "Skipping feed entry without title or link"
                    );
                    return None;
                };

                let published_at = entry
                    .published
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| now.clone());

                Some(NewsItem {
                    title,
                    url,
                    source: self.config.source_name.clone(),
                    description: entry
                        .summary
                        .map(|s| s.content.trim().to_string())
                        .unwrap_or_default(),
                    published_at,
                    image: None,
                })
            })
            .take(MAX_ITEMS)
            .collect();

        Ok(items)
    }
}

#[async_trait]
impl NewsSource for AtomFeedSource {
    fn name(&self) -> &str {
        "feed"
    }

    async fn fetch(&self) -> Result<Vec<NewsItem>, SourceError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Feed returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        self.parse_items(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Immigration, Refugees and Citizenship Canada news</title>
  <id>tag:canada.ca,2024:ircc-news</id>
  <updated>2024-01-15T12:00:00Z</updated>
  <entry>
    <title>New measures for international students</title>
    <link href="https://www.canada.ca/en/news/students.html"/>
    <id>tag:canada.ca,2024:students</id>
    <summary>IRCC announces changes to study permits.</summary>
    <published>2024-01-15T09:00:00-05:00</published>
    <updated>2024-01-15T09:00:00-05:00</updated>
  </entry>
  <entry>
    <link href="https://www.canada.ca/en/news/untitled.html"/>
    <id>tag:canada.ca,2024:untitled</id>
    <updated>2024-01-14T09:00:00Z</updated>
  </entry>
  <entry>
    <title>Entry without link</title>
    <id>tag:canada.ca,2024:nolink</id>
    <updated>2024-01-13T09:00:00Z</updated>
  </entry>
  <entry>
    <title>Citizenship ceremonies resume</title>
    <link href="https://www.canada.ca/en/news/ceremonies.html"/>
    <id>tag:canada.ca,2024:ceremonies</id>
  </entry>
</feed>"#;

    fn source(url: String) -> AtomFeedSource {
        AtomFeedSource::new(FeedConfig {
            url,
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_skips_entries_without_title_or_link() {
        let items = source(String::new()).parse_items(ATOM.as_bytes()).unwrap();

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "New measures for international students",
                "Citizenship ceremonies resume"
            ]
        );
        assert!(items.iter().all(|i| i.source == "IRCC Official"));
    }

    #[test]
    fn test_parse_normalizes_dates_and_defaults() {
        let items = source(String::new()).parse_items(ATOM.as_bytes()).unwrap();

        let first = &items[0];
        assert_eq!(first.description, "IRCC announces changes to study permits.");
        assert_eq!(
            first.published_timestamp(),
            news_digest_domain::parse_timestamp("2024-01-15T14:00:00Z")
        );

        let second = &items[1];
        assert_eq!(second.description, "");
        assert!(second.published_timestamp().is_some());
    }

    #[test]
    fn test_parse_missing_published_uses_current_time() {
        let doc = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>t</title>
  <id>f</id>
  <updated>2020-01-01T00:00:00Z</updated>
  <entry>
    <title>Only updated</title>
    <link href="https://www.canada.ca/en/news/only-updated.html"/>
    <id>only-updated</id>
    <updated>2020-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

        let items = source(String::new()).parse_items(doc.as_bytes()).unwrap();

        let published = items[0].published_timestamp().unwrap();
        let age = OffsetDateTime::now_utc() - published;
        assert!(
            age.whole_seconds().abs() < 60,
            "published_at = {}",
            items[0].published_at
        );
    }

    #[test]
    fn test_parse_caps_items() {
        let entries: String = (0..8)
            .map(|n| {
                format!(
                    r#"<entry><title>Story {n}</title><link href="https://www.canada.ca/{n}"/><id>id-{n}</id><updated>2024-01-1{n}T00:00:00Z</updated></entry>"#
                )
            })
            .collect();
        let doc = format!(
            r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"><title>t</title><id>f</id><updated>2024-01-01T00:00:00Z</updated>{}</feed>"#,
            entries
        );

        let items = source(String::new()).parse_items(doc.as_bytes()).unwrap();

        assert_eq!(items.len(), MAX_ITEMS);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = source(String::new()).parse_items(b"not a feed");
        assert!(matches!(result, Err(SourceError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_fetch_reads_feed_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news.atom.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/atom+xml")
                    .set_body_string(ATOM),
            )
            .mount(&mock_server)
            .await;

        let items = source(format!("{}/news.atom.xml", mock_server.uri()))
            .fetch()
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let result = source(format!("{}/news.atom.xml", mock_server.uri()))
            .fetch()
            .await;

        assert!(matches!(result, Err(SourceError::Api(_))));
    }
}
