use serde::{Deserialize, Serialize};

use crate::config::MetadataLinks;

pub mod tmdb;

pub use tmdb::TmdbMovieDetails;

/// A movie in the catalog. Its position in the catalog is its row/column in
/// the similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// External (TMDB) movie ID
    #[serde(alias = "id", alias = "external_id")]
    pub movie_id: u64,
    pub title: String,
}

/// How the queried title is kept out of its own recommendations
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelfExclusion {
    /// Drop the top-ranked candidate. Relies on the diagonal being the row maximum.
    #[default]
    Positional,
    /// Drop the queried index wherever it ranks
    Index,
}

/// Display metadata for a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieMetadata {
    pub poster_url: String,
    /// 0-10 scale
    pub vote_average: f64,
    pub vote_count: u64,
    pub overview: String,
    pub detail_url: String,
}

impl MovieMetadata {
    /// Placeholder metadata used when the lookup fails
    pub fn fallback(movie_id: u64, links: &MetadataLinks) -> Self {
        Self {
            poster_url: links.fallback_poster_url.clone(),
            vote_average: 0.0,
            vote_count: 0,
            overview: String::new(),
            detail_url: links.detail_url(movie_id),
        }
    }
}

/// Outcome of a metadata lookup. Lookups never fail outright: any error is
/// turned into `Fallback` carrying placeholder metadata and the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataLookup {
    Fetched(MovieMetadata),
    Fallback {
        metadata: MovieMetadata,
        reason: String,
    },
}

impl MetadataLookup {
    pub fn is_fallback(&self) -> bool {
        matches!(self, MetadataLookup::Fallback { .. })
    }

    pub fn source(&self) -> MetadataSource {
        match self {
            MetadataLookup::Fetched(_) => MetadataSource::Fetched,
            MetadataLookup::Fallback { .. } => MetadataSource::Fallback,
        }
    }

    pub fn into_metadata(self) -> MovieMetadata {
        match self {
            MetadataLookup::Fetched(metadata) => metadata,
            MetadataLookup::Fallback { metadata, .. } => metadata,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSource {
    Fetched,
    Fallback,
}

/// Five-star breakdown of a vote average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StarRating {
    /// Rating on a 0-5 scale, rounded to the nearest half star
    pub stars: f64,
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarRating {
    /// Values above 5 are read as a 0-10 score and halved; anything at or
    /// below 5 is taken as already on the 0-5 scale.
    pub fn from_vote_average(vote_average: f64) -> Self {
        let mut rating = if vote_average > 5.0 {
            vote_average / 2.0
        } else {
            vote_average
        };
        if rating.is_nan() {
            rating = 0.0;
        }
        let rating = rating.clamp(0.0, 5.0);
        let stars = (rating * 2.0).round_ties_even() / 2.0;

        let full = stars.floor() as u8;
        let half = u8::from(stars - f64::from(full) == 0.5);
        let empty = 5 - full - half;

        Self {
            stars,
            full,
            half,
            empty,
        }
    }
}

/// A single recommended movie returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// 1-based position in the ranking
    pub rank: usize,
    pub title: String,
    pub movie_id: u64,
    /// Similarity to the selected title
    pub score: f32,
    pub poster_url: String,
    pub vote_average: f64,
    pub vote_count: u64,
    pub overview: String,
    pub detail_url: String,
    pub rating: StarRating,
    pub metadata_source: MetadataSource,
}

impl Recommendation {
    pub fn new(rank: usize, entry: &CatalogEntry, score: f32, lookup: MetadataLookup) -> Self {
        let metadata_source = lookup.source();
        let metadata = lookup.into_metadata();

        Self {
            rank,
            title: entry.title.clone(),
            movie_id: entry.movie_id,
            score,
            rating: StarRating::from_vote_average(metadata.vote_average),
            poster_url: metadata.poster_url,
            vote_average: metadata.vote_average,
            vote_count: metadata.vote_count,
            overview: metadata.overview,
            detail_url: metadata.detail_url,
            metadata_source,
        }
    }
}

/// Request body for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Ordered recommendations for one selected title
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub selected: String,
    pub recommendations: Vec<Recommendation>,
    /// Informational message, set when there is nothing to recommend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub const NO_RECOMMENDATIONS_MESSAGE: &str = "No recommendations found for the selected title.";

impl RecommendationResponse {
    pub fn new(selected: String, recommendations: Vec<Recommendation>) -> Self {
        let message = recommendations
            .is_empty()
            .then(|| NO_RECOMMENDATIONS_MESSAGE.to_string());

        Self {
            selected,
            recommendations,
            message,
        }
    }
}
