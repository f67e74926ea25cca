//! Configuration loading and management

use anyhow::{Context, Result};
use news_digest_adapters::{
    atom_feed::FeedConfig as FeedSourceConfig, llm::LlmConfig as GeneratorConfig,
    news_api::NewsApiConfig as NewsApiSourceConfig,
};
use news_digest_domain::usecases::ComposeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub news_api: NewsApiConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub photos: PhotosConfig,

    #[serde(default)]
    pub digest: DigestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    #[serde(default = "default_latest_path")]
    pub latest_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between runs in `run --watch`
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_news_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_news_api_base_url")]
    pub base_url: String,

    #[serde(default = "default_news_api_query")]
    pub query: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,

    #[serde(default = "default_feed_source_name")]
    pub source_name: String,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    #[serde(default = "default_photos_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_photos_base_url")]
    pub base_url: String,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

// Default value functions
fn default_history_path() -> PathBuf {
    PathBuf::from("./blog_posts.json")
}

fn default_latest_path() -> PathBuf {
    PathBuf::from("./latest_post.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval() -> u64 {
    7 * 24 * 60 * 60
}

fn default_news_api_key_env() -> String {
    "NEWSAPI_KEY".to_string()
}

fn default_news_api_base_url() -> String {
    NewsApiSourceConfig::default().base_url
}

fn default_news_api_query() -> String {
    NewsApiSourceConfig::default().query
}

fn default_language() -> String {
    "en".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_lookback_days() -> i64 {
    7
}

fn default_source_timeout() -> u64 {
    10
}

fn default_feed_url() -> String {
    FeedSourceConfig::default().url
}

fn default_feed_source_name() -> String {
    FeedSourceConfig::default().source_name
}

fn default_llm_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    800
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_photos_api_key_env() -> String {
    "UNSPLASH_ACCESS_KEY".to_string()
}

fn default_photos_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_author() -> String {
    ComposeConfig::default().author
}

fn default_title_prefix() -> String {
    ComposeConfig::default().title_prefix
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            latest_path: default_latest_path(),
            log_level: default_log_level(),
            interval_secs: default_interval(),
        }
    }
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_news_api_key_env(),
            base_url: default_news_api_base_url(),
            query: default_news_api_query(),
            language: default_language(),
            page_size: default_page_size(),
            lookback_days: default_lookback_days(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            source_name: default_feed_source_name(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_api_key_env(),
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_photos_api_key_env(),
            base_url: default_photos_base_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            title_prefix: default_title_prefix(),
        }
    }
}

impl NewsApiConfig {
    pub fn to_source_config(&self) -> NewsApiSourceConfig {
        NewsApiSourceConfig {
            base_url: self.base_url.clone(),
            query: self.query.clone(),
            language: self.language.clone(),
            page_size: self.page_size,
            lookback_days: self.lookback_days,
            timeout_secs: self.timeout_secs,
        }
    }
}

impl FeedConfig {
    pub fn to_source_config(&self) -> FeedSourceConfig {
        FeedSourceConfig {
            url: self.url.clone(),
            source_name: self.source_name.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl LlmConfig {
    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}

impl DigestConfig {
    /// Compose settings with the configured author and title
    pub fn to_compose_config(&self) -> ComposeConfig {
        ComposeConfig {
            author: self.author.clone(),
            title_prefix: self.title_prefix.clone(),
            ..ComposeConfig::default()
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("NEWS_DIGEST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# news-digest configuration

[general]
history_path = "./blog_posts.json"
latest_path = "./latest_post.json"
log_level = "info"
# Seconds between posts for `run --watch` (one week)
interval_secs = 604800

[news_api]
# Source is skipped when this variable is unset
api_key_env = "NEWSAPI_KEY"
base_url = "https://newsapi.org"
query = 'Canada immigration OR "Canadian immigration" OR "immigrate to Canada" OR IRCC'
language = "en"
page_size = 10
lookback_days = 7
timeout_secs = 10

[feed]
url = "https://www.canada.ca/en/immigration-refugees-citizenship/news.atom.xml"
source_name = "IRCC Official"
timeout_secs = 10

[llm]
# Template content is used when this variable is unset
api_key_env = "DEEPSEEK_API_KEY"
base_url = "https://api.deepseek.com"
model = "deepseek-chat"
temperature = 0.7
max_output_tokens = 800
timeout_secs = 30

[photos]
# Built-in fallback images are used when this variable is unset
api_key_env = "UNSPLASH_ACCESS_KEY"
base_url = "https://api.unsplash.com"
timeout_secs = 10

[digest]
author = "The Culye Team"
title_prefix = "Canadian Immigration Weekly Update"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.general.interval_secs, defaults.general.interval_secs);
        assert_eq!(parsed.general.history_path, defaults.general.history_path);
        assert_eq!(parsed.news_api.query, defaults.news_api.query);
        assert_eq!(parsed.feed.url, defaults.feed.url);
        assert_eq!(parsed.llm.model, defaults.llm.model);
        assert_eq!(parsed.llm.base_url, defaults.llm.base_url);
        assert_eq!(parsed.photos.api_key_env, defaults.photos.api_key_env);
        assert_eq!(parsed.digest.author, defaults.digest.author);
        assert_eq!(parsed.digest.title_prefix, defaults.digest.title_prefix);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
[digest]
author = "Test Team"
"#,
        )
        .unwrap();

        assert_eq!(parsed.digest.author, "Test Team");
        assert_eq!(
            parsed.digest.title_prefix,
            "Canadian Immigration Weekly Update"
        );
        assert_eq!(parsed.feed.source_name, "IRCC Official");
        assert_eq!(parsed.llm.max_output_tokens, 800);
    }

    #[test]
    fn test_compose_config_keeps_prompt_defaults() {
        let digest = DigestConfig {
            author: "Test Team".to_string(),
            title_prefix: "Weekly".to_string(),
        };

        let compose = digest.to_compose_config();

        assert_eq!(compose.author, "Test Team");
        assert_eq!(compose.title_prefix, "Weekly");
        assert_eq!(compose.intro, ComposeConfig::default().intro);
    }
}
