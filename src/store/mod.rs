//! Read-only recommendation artifacts: the movie catalog and the
//! similarity matrix aligned to it by position.

use std::path::Path;

use crate::error::{AppError, AppResult};

pub mod catalog;
pub mod similarity;

pub use catalog::Catalog;
pub use similarity::SimilarityMatrix;

/// Catalog and similarity matrix, validated to have matching dimensions
#[derive(Debug, Clone)]
pub struct Stores {
    catalog: Catalog,
    similarity: SimilarityMatrix,
}

impl Stores {
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> AppResult<Self> {
        if catalog.len() != similarity.size() {
            return Err(AppError::DataContract(format!(
                "Catalog has {} entries but similarity matrix is {}x{}",
                catalog.len(),
                similarity.size(),
                similarity.size()
            )));
        }

        Ok(Self {
            catalog,
            similarity,
        })
    }

    /// Loads both artifacts from disk and validates them.
    ///
    /// Logs data-quality warnings (shadowed duplicate titles, rows whose
    /// diagonal is not the maximum) without failing.
    pub fn load(movies_path: impl AsRef<Path>, similarity_path: impl AsRef<Path>) -> AppResult<Self> {
        let catalog = Catalog::load(movies_path)?;
        let similarity = SimilarityMatrix::load(similarity_path)?;
        let stores = Self::new(catalog, similarity)?;

        let shadowed = stores.catalog.shadowed_titles();
        if shadowed > 0 {
            tracing::warn!(
                shadowed,
                "Catalog contains duplicate titles; only the first occurrence is reachable"
            );
        }

        let unstable = stores.similarity.rows_with_unstable_self_rank();
        if !unstable.is_empty() {
            tracing::warn!(
                rows = unstable.len(),
                first_row = unstable[0],
                "Similarity rows where the diagonal is not the unique maximum; positional self-exclusion may drop the wrong title"
            );
        }

        tracing::info!(movies = stores.catalog.len(), "Loaded catalog and similarity matrix");

        Ok(stores)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}
