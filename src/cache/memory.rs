use std::collections::HashMap;

use tokio::sync::RwLock;

use super::MetadataCache;
use crate::models::MovieMetadata;

/// Unbounded in-process cache. Entries live for the process lifetime.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<u64, MovieMetadata>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MetadataCache for InMemoryCache {
    async fn get(&self, movie_id: u64) -> Option<MovieMetadata> {
        self.entries.read().await.get(&movie_id).cloned()
    }

    async fn put(&self, movie_id: u64, metadata: &MovieMetadata) {
        self.entries.write().await.insert(movie_id, metadata.clone());
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(overview: &str) -> MovieMetadata {
        MovieMetadata {
            poster_url: "https://image.tmdb.org/t/p/w500/p.jpg".to_string(),
            vote_average: 6.4,
            vote_count: 120,
            overview: overview.to_string(),
            detail_url: "https://www.themoviedb.org/movie/7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = InMemoryCache::new();
        assert!(cache.get(7).await.is_none());

        cache.put(7, &metadata("first")).await;
        assert_eq!(cache.get(7).await, Some(metadata("first")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = InMemoryCache::new();
        cache.put(7, &metadata("first")).await;
        cache.put(7, &metadata("second")).await;

        assert_eq!(cache.get(7).await.unwrap().overview, "second");
        assert_eq!(cache.len().await, 1);
    }
}
