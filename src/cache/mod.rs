use std::sync::Arc;

use crate::{config::Config, error::AppResult, models::MovieMetadata};

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryCache;
pub use self::redis::{CacheKey, CacheWriterHandle, RedisCache};

/// Process-wide metadata cache keyed by external movie ID
///
/// Implementations never fail: backend errors are logged and reads degrade
/// to a miss.
#[async_trait::async_trait]
pub trait MetadataCache: Send + Sync {
    async fn get(&self, movie_id: u64) -> Option<MovieMetadata>;

    async fn put(&self, movie_id: u64, metadata: &MovieMetadata);

    /// Backend name for logging
    fn backend(&self) -> &'static str;
}

/// Builds the cache selected by configuration.
///
/// Returns the writer handle when Redis is used so the caller can flush
/// pending writes on shutdown.
pub async fn build_cache(
    config: &Config,
) -> AppResult<(Arc<dyn MetadataCache>, Option<CacheWriterHandle>)> {
    match &config.redis_url {
        Some(url) => {
            let client = self::redis::create_redis_client(url)?;
            let (cache, handle) = RedisCache::new(client, config.metadata_cache_ttl_secs).await;
            tracing::info!(backend = "redis", "Metadata cache ready");
            Ok((Arc::new(cache), Some(handle)))
        }
        None => {
            tracing::info!(backend = "memory", "Metadata cache ready");
            Ok((Arc::new(InMemoryCache::new()), None))
        }
    }
}
