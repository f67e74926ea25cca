//! In-memory post store for dry runs and testing

use async_trait::async_trait;
use news_digest_domain::{BlogPost, PostStore, StoreError, rotate_history};
use std::sync::RwLock;

/// In-memory post store implementation
pub struct InMemoryPostStore {
    history: RwLock<Vec<BlogPost>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::with_history(vec![])
    }

    /// Start from an existing history, e.g. the one on disk
    pub fn with_history(history: Vec<BlogPost>) -> Self {
        Self {
            history: RwLock::new(history),
        }
    }

    /// The post most recently inserted
    #[cfg(test)]
    pub fn latest(&self) -> Option<BlogPost> {
        self.history
            .read()
            .ok()
            .and_then(|history| history.first().cloned())
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn load(&self) -> Vec<BlogPost> {
        self.history
            .read()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    async fn insert(&self, post: &BlogPost) -> Result<(), StoreError> {
        let mut history = self
            .history
            .write()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        *history = rotate_history(std::mem::take(&mut *history), post);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_digest_domain::HISTORY_LIMIT;

    fn post(id: &str) -> BlogPost {
        BlogPost {
            id: id.to_string(),
            date: "January 16, 2024".to_string(),
            title: "Update".to_string(),
            content: "Content".to_string(),
            sources: vec![],
            author: "The Culye Team".to_string(),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_insert_prepends_and_sets_latest() {
        let store = InMemoryPostStore::with_history(vec![post("old")]);

        store.insert(&post("new")).await.unwrap();

        let ids: Vec<_> = store.load().await.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(store.latest().unwrap().id, "new");
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let store = InMemoryPostStore::new();

        for n in 0..15 {
            store.insert(&post(&n.to_string())).await.unwrap();
        }

        let history = store.load().await;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id, "14");
        assert_eq!(history[HISTORY_LIMIT - 1].id, "5");
    }
}
