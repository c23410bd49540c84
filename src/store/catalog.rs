use std::collections::HashSet;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::CatalogEntry,
};

/// Ordered, immutable list of movies
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of catalog entries
    pub fn from_json(json: &str) -> AppResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| AppError::DataContract(format!("Invalid catalog JSON: {}", e)))?;
        Ok(Self::new(entries))
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::DataContract(format!("Cannot read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Index of the first entry whose title equals `title` exactly
    pub fn position(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.title == title)
    }

    /// Number of entries unreachable by title because an earlier entry has the same title
    pub fn shadowed_titles(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .filter(|entry| !seen.insert(entry.title.as_str()))
            .count()
    }
}
