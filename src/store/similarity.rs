use std::path::Path;

use crate::error::{AppError, AppResult};

/// Square matrix of pairwise similarity scores, stored row-major
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Builds the matrix from rows, rejecting non-square shapes and
    /// non-finite scores.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(AppError::DataContract(format!(
                    "Similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(AppError::DataContract(format!(
                    "Similarity score at [{}][{}] is not finite",
                    i, j
                )));
            }
            scores.extend(row);
        }

        Ok(Self { size, scores })
    }

    /// Parses a JSON array of rows
    pub fn from_json(json: &str) -> AppResult<Self> {
        let rows: Vec<Vec<f32>> = serde_json::from_str(json)
            .map_err(|e| AppError::DataContract(format!("Invalid similarity JSON: {}", e)))?;
        Self::from_rows(rows)
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::DataContract(format!("Cannot read similarity {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Scores of item `index` against every item. Panics if out of range.
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.size;
        &self.scores[start..start + self.size]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.size && j < self.size {
            Some(self.scores[i * self.size + j])
        } else {
            None
        }
    }

    /// Rows whose diagonal would not rank first under a stable descending sort.
    ///
    /// For these rows, dropping the top-ranked candidate removes some other
    /// item instead of the row's own title.
    pub fn rows_with_unstable_self_rank(&self) -> Vec<usize> {
        (0..self.size)
            .filter(|&i| {
                let row = self.row(i);
                let diagonal = row[i];
                row[..i].iter().any(|&score| score >= diagonal)
                    || row[i + 1..].iter().any(|&score| score > diagonal)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_access() {
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.3], vec![0.3, 1.0]]).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.row(1), &[0.3, 1.0]);
        assert_eq!(matrix.get(0, 1), Some(0.3));
        assert_eq!(matrix.get(2, 0), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = SimilarityMatrix::from_rows(vec![vec![1.0, 0.3], vec![0.3]]).unwrap_err();
        assert!(matches!(err, AppError::DataContract(_)));
    }

    #[test]
    fn test_non_square_rejected() {
        let err = SimilarityMatrix::from_rows(vec![vec![1.0, 0.3, 0.2]]).unwrap_err();
        assert!(matches!(err, AppError::DataContract(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err =
            SimilarityMatrix::from_rows(vec![vec![1.0, f32::NAN], vec![0.1, 1.0]]).unwrap_err();
        assert!(err.to_string().contains("[0][1]"));
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = SimilarityMatrix::from_json("[]").unwrap();
        assert_eq!(matrix.size(), 0);
        assert!(matrix.rows_with_unstable_self_rank().is_empty());
    }

    #[test]
    fn test_well_formed_matrix_has_stable_self_rank() {
        let matrix = SimilarityMatrix::from_json(
            "[[1.0, 0.9, 0.9], [0.9, 1.0, 0.2], [0.9, 0.2, 1.0]]",
        )
        .unwrap();
        assert!(matrix.rows_with_unstable_self_rank().is_empty());
    }

    #[test]
    fn test_unstable_self_rank_detected() {
        // Row 1: an earlier column ties the diagonal and wins the stable sort.
        // Row 2: another column beats the diagonal outright.
        let matrix = SimilarityMatrix::from_json(
            "[[1.0, 1.0, 0.1], [1.0, 1.0, 0.1], [0.1, 0.9, 0.5]]",
        )
        .unwrap();
        assert_eq!(matrix.rows_with_unstable_self_rank(), vec![1, 2]);
    }
}
