/// Movie metadata provider abstraction
///
/// A provider turns an external movie ID into display metadata. Providers
/// report failures as errors; turning those into placeholder metadata is the
/// job of [`crate::services::metadata::MetadataService`].
use crate::{error::AppResult, models::MovieMetadata};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch display metadata for one movie
    async fn fetch_metadata(&self, movie_id: u64) -> AppResult<MovieMetadata>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
