use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    models::{MetadataSource, Recommendation, SelfExclusion},
    services::metadata::MetadataService,
    store::Stores,
};

/// A catalog index and its similarity to the selected title
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCandidate {
    pub index: usize,
    pub score: f32,
}

/// Ranks catalog entries by precomputed similarity to a selected title
#[derive(Clone)]
pub struct RecommendationEngine {
    stores: Arc<Stores>,
    self_exclusion: SelfExclusion,
}

impl RecommendationEngine {
    pub fn new(stores: Arc<Stores>, self_exclusion: SelfExclusion) -> Self {
        Self {
            stores,
            self_exclusion,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Top `top_n` candidates for `title`, most similar first.
    ///
    /// Ties keep ascending catalog order. Unknown titles and single-entry
    /// catalogs yield an empty list.
    pub fn rank(&self, title: &str, top_n: usize) -> Vec<RankedCandidate> {
        let Some(selected) = self.stores.catalog().position(title) else {
            return Vec::new();
        };

        let mut ranked: Vec<RankedCandidate> = self
            .stores
            .similarity()
            .row(selected)
            .iter()
            .enumerate()
            .map(|(index, &score)| RankedCandidate { index, score })
            .collect();

        // sort_by is stable, so equal scores stay in index order
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        match self.self_exclusion {
            SelfExclusion::Positional => ranked.into_iter().skip(1).take(top_n).collect(),
            SelfExclusion::Index => ranked
                .into_iter()
                .filter(|candidate| candidate.index != selected)
                .take(top_n)
                .collect(),
        }
    }

    /// Ranks candidates for `title` and enriches each with display metadata.
    ///
    /// Lookups run concurrently but results keep rank order. A failed lookup
    /// only degrades its own entry to fallback metadata.
    pub async fn recommend(
        &self,
        metadata: &MetadataService,
        title: &str,
        top_n: usize,
    ) -> Vec<Recommendation> {
        let catalog = self.stores.catalog();

        let pending: Vec<_> = self
            .rank(title, top_n)
            .into_iter()
            .filter_map(|candidate| {
                let entry = catalog.get(candidate.index)?;
                let service = metadata.clone();
                let movie_id = entry.movie_id;
                let task = tokio::spawn(async move { service.lookup(movie_id).await });
                Some((candidate, entry, task))
            })
            .collect();

        let mut recommendations = Vec::with_capacity(pending.len());
        for (position, (candidate, entry, task)) in pending.into_iter().enumerate() {
            let lookup = match task.await {
                Ok(lookup) => lookup,
                Err(e) => {
                    tracing::error!(error = %e, movie_id = entry.movie_id, "Metadata task join error");
                    metadata.fallback(entry.movie_id, e.to_string())
                }
            };

            recommendations.push(Recommendation::new(position + 1, entry, candidate.score, lookup));
        }

        let fallbacks = recommendations
            .iter()
            .filter(|r| r.metadata_source == MetadataSource::Fallback)
            .count();
        if fallbacks > 0 {
            tracing::warn!(
                title = %title,
                fallback_count = fallbacks,
                total = recommendations.len(),
                "Partial metadata failure"
            );
        }

        recommendations
    }
}
