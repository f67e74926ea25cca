//! Image resolution - one representative image per news item

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::{
    model::{ImageRef, NewsItem},
    ports::PhotoSearch,
};

/// Default images used when no photo can be resolved
pub const FALLBACK_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1503614472-8c93d56e92ce?w=800&q=80",
    "https://images.unsplash.com/photo-1519452635265-7b1fbfd1e4e0?w=800&q=80",
    "https://images.unsplash.com/photo-1609825488888-3a766db05542?w=800&q=80",
];

/// Prefix added to every photo search query
pub const PHOTO_QUERY_PREFIX: &str = "Canada ";

const TOPIC_SEPARATOR: char = '-';
const TOPIC_MAX_CHARS: usize = 30;

/// Derive the search topic from a headline.
///
/// Text before the first separator when the title has one, otherwise the
/// first 30 characters.
pub fn topic_for_title(title: &str) -> &str {
    if let Some((head, _)) = title.split_once(TOPIC_SEPARATOR) {
        return head;
    }

    match title.char_indices().nth(TOPIC_MAX_CHARS) {
        Some((byte_idx, _)) => &title[..byte_idx],
        None => title,
    }
}

/// Fallback pool index for a topic, hash version 1.
///
/// SHA-256 of the UTF-8 topic, first 8 digest bytes read as a big-endian
/// u64, reduced modulo the pool size.
pub fn fallback_index(topic: &str, pool_size: usize) -> usize {
    let digest = Sha256::digest(topic.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % pool_size as u64) as usize
}

/// Deterministic fallback image for a topic
pub fn fallback_image(topic: &str) -> &'static str {
    FALLBACK_IMAGES[fallback_index(topic, FALLBACK_IMAGES.len())]
}

/// Resolves images for items, degrading to the fallback pool
pub struct ImageResolver<P: PhotoSearch + ?Sized> {
    photos: Option<Arc<P>>,
}

impl<P: PhotoSearch + ?Sized> ImageResolver<P> {
    pub fn new(photos: Option<Arc<P>>) -> Self {
        Self { photos }
    }

    /// Resolver that never calls the photo search boundary
    #[cfg(test)]
    pub fn offline() -> Self {
        Self { photos: None }
    }

    /// Image for a news item, inline image first
    pub async fn resolve(&self, item: &NewsItem) -> ImageRef {
        if let Some(url) = item.inline_image() {
            return ImageRef::inline(url);
        }

        self.resolve_topic(topic_for_title(&item.title)).await
    }

    /// Image for a topic string, photo search first
    pub async fn resolve_topic(&self, topic: &str) -> ImageRef {
        if let Some(photos) = &self.photos {
            let query = format!("{}{}", PHOTO_QUERY_PREFIX, topic);
            match photos.search(&query).await {
                Ok(photo) => {
                    return ImageRef::ResolvedPhoto {
                        url: photo.url,
                        credit: format!("{} on {}", photo.photographer, photos.provider()),
                        link: photo.link,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        topic = %topic,
                        error = %e,
                        "Photo search failed, using fallback image"
                    );
                }
            }
        }

        ImageRef::inline(fallback_image(topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Photo, PhotoError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakePhotos {
        result: Option<Photo>,
        queries: Mutex<Vec<String>>,
    }

    impl FakePhotos {
        fn new(result: Option<Photo>) -> Self {
            Self {
                result,
                queries: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl PhotoSearch for FakePhotos {
        async fn search(&self, query: &str) -> Result<Photo, PhotoError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.result
                .clone()
                .ok_or_else(|| PhotoError::Api("boom".to_string()))
        }

        fn provider(&self) -> &'static str {
            "Unsplash"
        }
    }

    fn item(title: &str, image: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            url: "https://example.com/story".to_string(),
            source: "Example".to_string(),
            description: String::new(),
            published_at: String::new(),
            image: image.map(String::from),
        }
    }

    #[test]
    fn test_topic_uses_text_before_separator() {
        assert_eq!(
            topic_for_title("Express Entry draw - 1,500 invited"),
            "Express Entry draw "
        );
    }

    #[test]
    fn test_topic_truncates_to_30_chars() {
        let title = "Canada announces new study permit caps for 2025";
        assert_eq!(topic_for_title(title), "Canada announces new study per");
        assert_eq!(topic_for_title("Short"), "Short");
    }

    #[test]
    fn test_topic_truncation_respects_char_boundaries() {
        let title = "é".repeat(40);
        assert_eq!(topic_for_title(&title).chars().count(), 30);
    }

    #[test]
    fn test_fallback_index_is_stable_and_in_range() {
        let first = fallback_index("Express Entry", 3);
        for _ in 0..5 {
            assert_eq!(fallback_index("Express Entry", 3), first);
        }
        assert!(first < 3);
    }

    #[test]
    fn test_fallback_index_matches_hash_definition() {
        // sha256("") = e3b0c44298fc1c14...
        let expected = (0xe3b0c44298fc1c14_u64 % 3) as usize;
        assert_eq!(fallback_index("", 3), expected);
    }

    #[tokio::test]
    async fn test_inline_image_preferred_without_search() {
        let photos = Arc::new(FakePhotos::new(None));
        let resolver = ImageResolver::new(Some(Arc::clone(&photos)));

        let image = resolver
            .resolve(&item("Title", Some("https://img.example.com/a.jpg")))
            .await;

        assert_eq!(image, ImageRef::inline("https://img.example.com/a.jpg"));
        assert!(photos.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_resolver_returns_same_fallback_twice() {
        let resolver: ImageResolver<FakePhotos> = ImageResolver::offline();

        let first = resolver.resolve_topic("Study permits").await;
        let second = resolver.resolve_topic("Study permits").await;

        assert_eq!(first, second);
        assert!(FALLBACK_IMAGES.contains(&first.url()));
    }

    #[tokio::test]
    async fn test_resolved_photo_carries_credit() {
        let photos = Arc::new(FakePhotos::new(Some(Photo {
            url: "https://images.unsplash.com/photo-x".to_string(),
            photographer: "Jane Doe".to_string(),
            link: "https://unsplash.com/photos/x".to_string(),
        })));
        let resolver = ImageResolver::new(Some(Arc::clone(&photos)));

        let image = resolver.resolve(&item("Citizenship - new rules", None)).await;

        assert_eq!(
            image,
            ImageRef::ResolvedPhoto {
                url: "https://images.unsplash.com/photo-x".to_string(),
                credit: "Jane Doe on Unsplash".to_string(),
                link: "https://unsplash.com/photos/x".to_string(),
            }
        );
        assert_eq!(
            photos.queries.lock().unwrap().as_slice(),
            ["Canada Citizenship "]
        );
    }

    #[tokio::test]
    async fn test_search_failure_falls_back_to_pool() {
        let photos = Arc::new(FakePhotos::new(None));
        let resolver = ImageResolver::new(Some(photos));

        let image = resolver.resolve(&item("Citizenship - new rules", None)).await;

        assert_eq!(image, ImageRef::inline(fallback_image("Citizenship ")));
    }
}
