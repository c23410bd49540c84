// ============================================================================
// TMDB API Types
// ============================================================================

use serde::Deserialize;

use super::MovieMetadata;
use crate::config::MetadataLinks;

/// Subset of the TMDB `GET /3/movie/{id}` response used for display.
///
/// Every field is optional: TMDB omits or nulls them freely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl TmdbMovieDetails {
    pub fn into_metadata(self, movie_id: u64, links: &MetadataLinks) -> MovieMetadata {
        MovieMetadata {
            poster_url: links.poster_url(self.poster_path.as_deref()),
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
            overview: self.overview.unwrap_or_default(),
            detail_url: links.detail_url(movie_id),
        }
    }
}
