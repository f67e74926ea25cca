//! Optional API credentials, read from the environment variables named in config

use secrecy::SecretString;

use crate::config::AppConfig;

/// The three independent credentials; any of them may be absent
#[derive(Default)]
pub struct Credentials {
    /// Structured news search
    pub search: Option<SecretString>,
    /// Generative text
    pub generative: Option<SecretString>,
    /// Photo search
    pub photo: Option<SecretString>,
}

impl Credentials {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            search: load_optional_key(&config.news_api.api_key_env),
            generative: load_optional_key(&config.llm.api_key_env),
            photo: load_optional_key(&config.photos.api_key_env),
        }
    }
}

/// Read a key from `env_var`; unset, empty or unnamed means absent
pub fn load_optional_key(env_var: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        return None;
    }

    non_empty_secret(std::env::var(env_var).ok())
}

fn non_empty_secret(value: Option<String>) -> Option<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::new(v.into()))
}
