//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{BlogPost, NewsItem};

/// Error type for news source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Port for fetching news items from one external source
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the current batch of items from this source
    async fn fetch(&self) -> Result<Vec<NewsItem>, SourceError>;
}

/// A photo returned by the photo search boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Display-size image URL
    pub url: String,
    /// Photographer name
    pub photographer: String,
    /// Link to the photo page on the provider
    pub link: String,
}

/// Error type for photo search operations
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("No photo found for query: {0}")]
    NotFound(String),
}

/// Port for searching stock photos
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// Return the best landscape photo for a query
    async fn search(&self, query: &str) -> Result<Photo, PhotoError>;

    /// Provider name used in photo credits (e.g., "Unsplash")
    fn provider(&self) -> &'static str;
}

/// A single prompt for the text generator
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System role content
    pub system: String,
    /// User role content
    pub prompt: String,
}

/// Error type for text generation operations
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
}

/// Port for generative text (LLM) calls
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a request, single attempt
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Error type for post store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the bounded post history
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Load the stored history, newest first.
    ///
    /// A missing or unreadable history is an empty history.
    async fn load(&self) -> Vec<BlogPost>;

    /// Prepend a post, rotate the history and replace the latest slot
    async fn insert(&self, post: &BlogPost) -> Result<(), StoreError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
