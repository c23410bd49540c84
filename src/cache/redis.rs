use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use super::MetadataCache;
use crate::error::AppResult;
use crate::models::MovieMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieMetadata(u64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieMetadata(movie_id) => write!(f, "tmdb:movie:{}", movie_id),
        }
    }
}

/// Creates a Redis client for caching
///
/// Only validates the URL; connections are opened lazily per operation.
pub fn create_redis_client(redis_url: &str) -> AppResult<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct CacheWrite {
    key: String,
    value: String,
}

/// Redis-backed metadata cache
///
/// Reads go straight to Redis. Writes are queued to a background task so a
/// slow Redis never delays a recommendation response.
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWrite>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to stop and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl RedisCache {
    /// Creates the cache and spawns its background writer
    pub async fn new(redis_client: Client, ttl_secs: u64) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::writer_task(client, ttl_secs, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    async fn writer_task(
        client: Client,
        ttl_secs: u64,
        mut write_rx: mpsc::UnboundedReceiver<CacheWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::write(&client, write, ttl_secs).await {
                        tracing::warn!(error = %e, "Failed to write metadata to Redis");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Drain what is already queued; senders may still be alive
                    let mut flushed = 0usize;
                    while let Ok(write) = write_rx.try_recv() {
                        if let Err(e) = Self::write(&client, write, ttl_secs).await {
                            tracing::warn!(error = %e, "Failed to flush metadata write during shutdown");
                        }
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer flushed pending writes");
                    break;
                }
            }
        }
    }

    async fn write(client: &Client, write: CacheWrite, ttl_secs: u64) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, ttl_secs).await?;
        Ok(())
    }

    async fn read(&self, key: &CacheKey) -> AppResult<Option<MovieMetadata>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl MetadataCache for RedisCache {
    async fn get(&self, movie_id: u64) -> Option<MovieMetadata> {
        let key = CacheKey::MovieMetadata(movie_id);
        match self.read(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis read failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, movie_id: u64, metadata: &MovieMetadata) {
        let value = match serde_json::to_string(metadata) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = CacheWrite {
            key: CacheKey::MovieMetadata(movie_id).to_string(),
            value,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(movie_id, "Cache writer is gone, dropping metadata write");
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
