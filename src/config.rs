use serde::Deserialize;
use std::time::Duration;

use crate::models::SelfExclusion;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a TMDB `poster_path` to build the poster URL
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Prefix of the public movie page, joined with the movie ID
    #[serde(default = "default_tmdb_detail_base_url")]
    pub tmdb_detail_base_url: String,

    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Poster shown when TMDB has no poster or the lookup failed
    #[serde(default = "default_fallback_poster_url")]
    pub fallback_poster_url: String,

    /// Per-call timeout for metadata lookups, in seconds
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,

    /// Catalog artifact (JSON array of movies)
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Similarity artifact (JSON square matrix)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Number of recommendations when the request doesn't specify one
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default)]
    pub self_exclusion: SelfExclusion,

    /// Redis connection URL. When unset metadata is cached in process memory.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL for metadata stored in Redis, in seconds
    #[serde(default = "default_metadata_cache_ttl_secs")]
    pub metadata_cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_detail_base_url() -> String {
    "https://www.themoviedb.org/movie".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_fallback_poster_url() -> String {
    "https://via.placeholder.com/400x600?text=No+Image".to_string()
}

fn default_metadata_timeout_secs() -> u64 {
    6
}

fn default_movies_path() -> String {
    "data/movies.json".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.json".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_metadata_cache_ttl_secs() -> u64 {
    604800 // 1 week
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make every request fail
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_top_n == 0 {
            anyhow::bail!("DEFAULT_TOP_N must be at least 1");
        }
        if self.metadata_timeout_secs == 0 {
            anyhow::bail!("METADATA_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn metadata_links(&self) -> MetadataLinks {
        MetadataLinks {
            image_base_url: self.tmdb_image_base_url.clone(),
            detail_base_url: self.tmdb_detail_base_url.clone(),
            fallback_poster_url: self.fallback_poster_url.clone(),
        }
    }
}

/// URL templates shared by the TMDB provider and the metadata fallback.
///
/// Detail URLs are built locally from the movie ID, so they are available
/// even when the metadata lookup itself fails.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLinks {
    pub image_base_url: String,
    pub detail_base_url: String,
    pub fallback_poster_url: String,
}

impl MetadataLinks {
    /// Full poster URL for a TMDB `poster_path`, or the fallback poster
    pub fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path {
            Some(path) if !path.is_empty() => format!("{}{}", self.image_base_url, path),
            _ => self.fallback_poster_url.clone(),
        }
    }

    pub fn detail_url(&self, movie_id: u64) -> String {
        format!("{}/{}", self.detail_base_url.trim_end_matches('/'), movie_id)
    }
}

impl Default for MetadataLinks {
    fn default() -> Self {
        Self {
            image_base_url: default_tmdb_image_base_url(),
            detail_base_url: default_tmdb_detail_base_url(),
            fallback_poster_url: default_fallback_poster_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Vec<(String, String)> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(env(&[("TMDB_API_KEY", "secret")])).unwrap();

        assert_eq!(config.tmdb_api_key, "secret");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org");
        assert_eq!(config.metadata_timeout_secs, 6);
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.self_exclusion, SelfExclusion::Positional);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        tokio_test::assert_err!(envy::from_iter::<_, Config>(env(&[("PORT", "8080")])));
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(env(&[
            ("TMDB_API_KEY", "secret"),
            ("SELF_EXCLUSION", "index"),
            ("DEFAULT_TOP_N", "10"),
            ("REDIS_URL", "redis://cache:6379"),
            ("METADATA_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.self_exclusion, SelfExclusion::Index);
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.metadata_timeout(), Duration::from_secs(2));
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_zero_default_top_n_is_rejected() {
        let config: Config =
            envy::from_iter(env(&[("TMDB_API_KEY", "secret"), ("DEFAULT_TOP_N", "0")])).unwrap();

        let err = tokio_test::assert_err!(config.validate());
        assert!(err.to_string().contains("DEFAULT_TOP_N"));
    }

    #[test]
    fn test_zero_metadata_timeout_is_rejected() {
        let config: Config = envy::from_iter(env(&[
            ("TMDB_API_KEY", "secret"),
            ("METADATA_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();

        tokio_test::assert_err!(config.validate());
    }

    #[test]
    fn test_poster_url_with_path() {
        let links = MetadataLinks::default();
        assert_eq!(
            links.poster_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_poster_url_missing_or_empty_path_uses_fallback() {
        let links = MetadataLinks::default();
        assert_eq!(links.poster_url(None), links.fallback_poster_url);
        assert_eq!(links.poster_url(Some("")), links.fallback_poster_url);
    }

    #[test]
    fn test_detail_url() {
        let links = MetadataLinks::default();
        assert_eq!(links.detail_url(19995), "https://www.themoviedb.org/movie/19995");
    }
}
