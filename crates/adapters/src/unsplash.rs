//! Unsplash photo search adapter

use async_trait::async_trait;
use news_digest_domain::{Photo, PhotoError, PhotoSearch};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Unsplash search client, one landscape result per query
pub struct UnsplashPhotoSearch {
    client: Client,
    access_key: SecretString,
    base_url: String,
}

impl UnsplashPhotoSearch {
    pub fn new(access_key: SecretString, timeout_secs: u64) -> Self {
        Self::with_base_url(
            access_key,
            "https://api.unsplash.com".to_string(),
            timeout_secs,
        )
    }

    pub fn with_base_url(access_key: SecretString, base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            access_key,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
    user: PhotoUser,
    links: PhotoLinks,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Deserialize)]
struct PhotoUser {
    name: String,
}

#[derive(Deserialize)]
struct PhotoLinks {
    html: String,
}

#[async_trait]
impl PhotoSearch for UnsplashPhotoSearch {
    async fn search(&self, query: &str) -> Result<Photo, PhotoError> {
        let url = format!("{}/search/photos", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Client-ID {}", self.access_key.expose_secret()),
            )
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ])
            .send()
            .await
            .map_err(|e| PhotoError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PhotoError::Api(format!(
                "Unsplash returned {}: {}",
                status, body
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| PhotoError::Api(format!("Invalid response: {}", e)))?;

        let result = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PhotoError::NotFound(query.to_string()))?;

        Ok(Photo {
            url: result.urls.regular,
            photographer: result.user.name,
            link: result.links.html,
        })
    }

    fn provider(&self) -> &'static str {
        "Unsplash"
    }
}
