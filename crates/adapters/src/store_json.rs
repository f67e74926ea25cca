//! JSON file post store
//!
//! Keeps two artifacts: the bounded history (newest first) and a copy of
//! the latest post. Every write replaces the whole file through a sibling
//! temporary file and a rename, so readers never see a partial document.

use async_trait::async_trait;
use news_digest_domain::{BlogPost, PostStore, StoreError, rotate_history};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File-backed post store
#[derive(Debug, Clone)]
pub struct JsonFilePostStore {
    history_path: PathBuf,
    latest_path: PathBuf,
}

impl JsonFilePostStore {
    pub fn new(history_path: impl Into<PathBuf>, latest_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            latest_path: latest_path.into(),
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    /// Read the history, reporting why it could not be used
    pub async fn read_history(&self) -> Result<Vec<BlogPost>, StoreError> {
        let content = fs::read_to_string(&self.history_path).await?;
        serde_json::from_str(&content).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl PostStore for JsonFilePostStore {
    async fn load(&self) -> Vec<BlogPost> {
        match self.read_history().await {
            Ok(posts) => posts,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.history_path.display(), "No history yet");
                vec![]
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.history_path.display(),
                    error = %e,
                    "History unreadable, starting from empty history"
                );
                vec![]
            }
        }
    }

    async fn insert(&self, post: &BlogPost) -> Result<(), StoreError> {
        let history = rotate_history(self.load().await, post);

        replace_json(&self.history_path, &history).await?;
        replace_json(&self.latest_path, post).await?;

        tracing::info!(
            path = %self.history_path.display(),
            entries = history.len(),
            "Saved post history"
        );

        Ok(())
    }
}

/// Serialize `value` and atomically replace the file at `path`
async fn replace_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_path = temp_path(path);
    let result = match write_file(&tmp_path, &json).await {
        Ok(()) => fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(&tmp_path).await {
            tracing::debug!(path = %tmp_path.display(), error = %cleanup, "Temp file not removed");
        }
        return Err(e.into());
    }

    Ok(())
}

async fn write_file(path: &Path, json: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(json).await?;
    file.write_all(b"\n").await?;
    file.sync_all().await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}
