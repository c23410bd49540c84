use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::MetadataCache,
    config::MetadataLinks,
    error::AppResult,
    models::{MetadataLookup, MovieMetadata},
    services::providers::MetadataProvider,
};

/// Cached, failure-tolerant metadata lookups
///
/// Successful fetches are cached by movie ID. Failures and timeouts become
/// [`MetadataLookup::Fallback`] and are not cached, so the next request
/// retries the provider.
#[derive(Clone)]
pub struct MetadataService {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn MetadataCache>,
    links: MetadataLinks,
    timeout: Duration,
}

impl MetadataService {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn MetadataCache>,
        links: MetadataLinks,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            links,
            timeout,
        }
    }

    /// Cache read and provider call together are bounded by the timeout
    pub async fn lookup(&self, movie_id: u64) -> MetadataLookup {
        let reason = match tokio::time::timeout(self.timeout, self.fetch(movie_id)).await {
            Ok(Ok(metadata)) => return MetadataLookup::Fetched(metadata),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}s", self.timeout.as_secs_f32()),
        };

        tracing::warn!(
            movie_id,
            provider = self.provider.name(),
            reason = %reason,
            "Metadata lookup failed, using fallback"
        );

        self.fallback(movie_id, reason)
    }

    async fn fetch(&self, movie_id: u64) -> AppResult<MovieMetadata> {
        if let Some(cached) = self.cache.get(movie_id).await {
            tracing::debug!(movie_id, backend = self.cache.backend(), "Metadata cache hit");
            return Ok(cached);
        }

        let metadata = self.provider.fetch_metadata(movie_id).await?;
        self.cache.put(movie_id, &metadata).await;
        Ok(metadata)
    }

    /// Placeholder result for `movie_id`
    pub fn fallback(&self, movie_id: u64, reason: impl Into<String>) -> MetadataLookup {
        MetadataLookup::Fallback {
            metadata: MovieMetadata::fallback(movie_id, &self.links),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::InMemoryCache,
        error::AppError,
        services::providers::{MockMetadataProvider, TmdbProvider},
    };
    use mockall::predicate::eq;

    fn metadata(movie_id: u64) -> MovieMetadata {
        MovieMetadata {
            poster_url: format!("https://image.tmdb.org/t/p/w500/{}.jpg", movie_id),
            vote_average: 7.0,
            vote_count: 10,
            overview: "Overview".to_string(),
            detail_url: format!("https://www.themoviedb.org/movie/{}", movie_id),
        }
    }

    fn service(provider: impl MetadataProvider + 'static, cache: Arc<InMemoryCache>) -> MetadataService {
        MetadataService::new(
            Arc::new(provider),
            cache,
            MetadataLinks::default(),
            Duration::from_secs(6),
        )
    }

    #[tokio::test]
    async fn test_success_is_cached() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_metadata()
            .with(eq(603))
            .times(1)
            .returning(|id| Ok(metadata(id)));
        provider.expect_name().return_const("mock");

        let cache = Arc::new(InMemoryCache::new());
        let service = service(provider, cache.clone());

        let first = service.lookup(603).await;
        let second = service.lookup(603).await;

        assert_eq!(first, MetadataLookup::Fetched(metadata(603)));
        assert_eq!(first, second);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_is_not_cached() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_metadata()
            .times(2)
            .returning(|_| Err(AppError::ExternalApi("TMDB API returned status 503".to_string())));
        provider.expect_name().return_const("mock");

        let cache = Arc::new(InMemoryCache::new());
        let service = service(provider, cache.clone());

        let lookup = service.lookup(42).await;
        assert!(lookup.is_fallback());
        if let MetadataLookup::Fallback { reason, .. } = &lookup {
            assert!(reason.contains("503"));
        }

        let metadata = lookup.into_metadata();
        assert_eq!(metadata.vote_average, 0.0);
        assert_eq!(metadata.vote_count, 0);
        assert!(metadata.overview.is_empty());
        assert_eq!(metadata.detail_url, "https://www.themoviedb.org/movie/42");

        // Retried, not served from cache
        assert!(service.lookup(42).await.is_fallback());
        assert!(cache.is_empty().await);
    }

    struct SlowProvider;

    #[async_trait::async_trait]
    impl MetadataProvider for SlowProvider {
        async fn fetch_metadata(&self, movie_id: u64) -> AppResult<MovieMetadata> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(metadata(movie_id))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let service = MetadataService::new(
            Arc::new(SlowProvider),
            Arc::new(InMemoryCache::new()),
            MetadataLinks::default(),
            Duration::from_millis(50),
        );

        let lookup = service.lookup(7).await;
        match lookup {
            MetadataLookup::Fallback { metadata, reason } => {
                assert!(reason.contains("timed out"));
                assert_eq!(metadata.detail_url, "https://www.themoviedb.org/movie/7");
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_metadata().never();

        let cache = Arc::new(InMemoryCache::new());
        cache.put(11, &metadata(11)).await;
        let service = service(provider, cache);

        assert_eq!(service.lookup(11).await, MetadataLookup::Fetched(metadata(11)));
    }

    /// Cache whose reads never complete, like a blackholed Redis
    struct StalledCache;

    #[async_trait::async_trait]
    impl MetadataCache for StalledCache {
        async fn get(&self, _movie_id: u64) -> Option<MovieMetadata> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            None
        }

        async fn put(&self, _movie_id: u64, _metadata: &MovieMetadata) {}

        fn backend(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_stalled_cache_read_falls_back_within_timeout() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_metadata().never();
        provider.expect_name().return_const("mock");

        let service = MetadataService::new(
            Arc::new(provider),
            Arc::new(StalledCache),
            MetadataLinks::default(),
            Duration::from_millis(100),
        );

        let lookup = tokio::time::timeout(Duration::from_secs(2), service.lookup(1))
            .await
            .expect("lookup should be bounded by the metadata timeout");
        match lookup {
            MetadataLookup::Fallback { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fallback_reason_does_not_expose_api_key() {
        let provider = TmdbProvider::new(
            "SUPERSECRETKEY".to_string(),
            "http://127.0.0.1:1".to_string(),
            "en-US".to_string(),
            MetadataLinks::default(),
            Duration::from_secs(2),
        )
        .unwrap();
        let service = service(provider, Arc::new(InMemoryCache::new()));

        match service.lookup(603).await {
            MetadataLookup::Fallback { reason, .. } => {
                assert!(!reason.contains("SUPERSECRETKEY"), "reason leaked key: {}", reason);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }
}
