/// TMDB metadata provider
///
/// API Flow:
/// 1. Details: /3/movie/{id} → poster path, vote average/count, overview
///
/// Poster and detail page URLs are assembled locally from configured prefixes.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    config::{Config, MetadataLinks},
    error::{AppError, AppResult},
    models::{MovieMetadata, TmdbMovieDetails},
    services::providers::MetadataProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    links: MetadataLinks,
}

impl TmdbProvider {
    /// Creates a provider whose HTTP calls are bounded by `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        links: MetadataLinks,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            links,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
            config.metadata_links(),
            config.metadata_timeout(),
        )
    }
}

/// The request URL carries the API key as a query parameter
fn redact_url(e: reqwest::Error) -> AppError {
    AppError::HttpClient(e.without_url())
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_metadata(&self, movie_id: u64) -> AppResult<MovieMetadata> {
        let url = format!("{}/3/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(redact_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await.map_err(redact_url)?;
        tracing::trace!(movie_id, response = %response_text, "Raw TMDB response");

        let details: TmdbMovieDetails = serde_json::from_str(&response_text).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })?;

        let metadata = details.into_metadata(movie_id, &self.links);

        tracing::debug!(
            movie_id,
            vote_average = metadata.vote_average,
            provider = "tmdb",
            "Metadata fetched"
        );

        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
