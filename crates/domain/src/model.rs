//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// A single news story normalized from any source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Canonical link, unique within a ranked set
    pub url: String,
    /// Human-readable publisher name
    pub source: String,
    /// Short summary, may be empty
    #[serde(default)]
    pub description: String,
    /// Publication timestamp as reported by the source
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    /// Image supplied by the source, if any
    #[serde(default)]
    pub image: Option<String>,
}

impl NewsItem {
    /// Parse `published_at` into a comparable timestamp.
    ///
    /// Accepts RFC 3339, RFC 2822 and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn published_timestamp(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.published_at)
    }

    /// Inline image, ignoring empty strings
    pub fn inline_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Parse the timestamp formats news sources are known to emit
pub fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(ts);
    }

    if let Ok(ts) = OffsetDateTime::parse(text, &Rfc2822) {
        return Some(ts);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Image attached to one source item of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Photo found through the photo search boundary, with attribution
    ResolvedPhoto {
        url: String,
        credit: String,
        link: String,
    },
    /// Plain image URL (source supplied or from the fallback pool)
    InlineUrl { url: String },
}

impl ImageRef {
    pub fn inline(url: impl Into<String>) -> Self {
        Self::InlineUrl { url: url.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::ResolvedPhoto { url, .. } | Self::InlineUrl { url } => url,
        }
    }
}

/// Reference to a ranked item, as published with the post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub source: String,
}

impl From<&NewsItem> for SourceRef {
    fn from(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
        }
    }
}

/// The generated digest document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Short opaque identifier
    pub id: String,
    /// Display date, e.g. "October 16, 2026"
    pub date: String,
    pub title: String,
    pub content: String,
    /// One entry per ranked item, in rank order
    pub sources: Vec<SourceRef>,
    pub author: String,
    /// One image per entry in `sources`
    pub images: Vec<ImageRef>,
}

/// Which content generation path produced a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPath {
    /// Content written by the generative text boundary
    Ai,
    /// Deterministic template fallback
    Template,
}

/// Result of a successful pipeline run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The post that was stored
    pub post: BlogPost,
    /// How the content was produced
    pub generation: GenerationPath,
    /// Items received from all sources before deduplication
    pub fetched: usize,
    /// Items that made it into the post
    pub ranked: usize,
}
