//! Dense all-pairs cosine similarity.
//!
//! The matrix is N×N `f32`, row-major, so memory grows as O(N²): about
//! 370 MB for the ~9.7k movies of MovieLens latest-small, and far beyond
//! that for the full dataset. There is no sparse or approximate fallback.

use crate::tfidf::SparseVector;
use rayon::prelude::*;

/// Immutable symmetric similarity matrix; row/column `i` is corpus row `i`
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Gram matrix of L2-normalized vectors.
    ///
    /// Values are clamped to `[0, 1]` and the diagonal is exactly `1.0`,
    /// including for documents with an empty vector.
    pub fn from_normalized(vectors: &[SparseVector]) -> Self {
        let n = vectors.len();
        let values: Vec<f32> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let row = &vectors[i];
                (0..n).map(move |j| {
                    if i == j {
                        1.0
                    } else {
                        row.dot(&vectors[j]).clamp(0.0, 1.0)
                    }
                })
            })
            .collect();

        Self { n, values }
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarities of row `i` to every row
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.n {
            return None;
        }
        Some(&self.values[i * self.n..(i + 1) * self.n])
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.row(i).and_then(|row| row.get(j).copied())
    }

    /// Bytes held by the dense value buffer
    pub fn memory_bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfidf::TfIdfModel;

    fn matrix_for(docs: &[&str]) -> SimilarityMatrix {
        let model = TfIdfModel::fit(docs).unwrap();
        SimilarityMatrix::from_normalized(model.vectors())
    }

    #[test]
    fn test_two_comedies() {
        let matrix = matrix_for(&["Animation|Comedy", "Adventure|Comedy"]);

        // 1 / (1.405465² + 1)
        let expected = 1.0 / (1.405_465f32.powi(2) + 1.0);
        assert!((matrix.get(0, 1).unwrap() - expected).abs() < 1e-5);
        assert_eq!(matrix.get(0, 0), Some(1.0));
        assert_eq!(matrix.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let matrix = matrix_for(&[
            "Action|Crime|Thriller",
            "Action|Adventure|Thriller",
            "Comedy|Romance",
            "Drama",
            "",
        ]);

        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                let v = matrix.get(i, j).unwrap();
                assert!((0.0..=1.0).contains(&v));
                assert_eq!(v, matrix.get(j, i).unwrap());
            }
        }
    }

    #[test]
    fn test_empty_document_row() {
        let matrix = matrix_for(&["Drama", ""]);
        assert_eq!(matrix.get(1, 1), Some(1.0));
        assert_eq!(matrix.get(1, 0), Some(0.0));
    }

    #[test]
    fn test_disjoint_documents_are_zero() {
        let matrix = matrix_for(&["Horror", "Musical"]);
        assert_eq!(matrix.get(0, 1), Some(0.0));
    }

    #[test]
    fn test_out_of_range_row() {
        let matrix = matrix_for(&["Horror", "Musical"]);
        assert!(matrix.row(2).is_none());
        assert_eq!(matrix.memory_bytes(), 4 * std::mem::size_of::<f32>());
    }
}
