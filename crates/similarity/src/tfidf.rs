//! TF-IDF vectorization.
//!
//! - tf: raw term count within the document
//! - idf: smoothed, `ln((1 + N) / (1 + df)) + 1`
//! - each document vector is L2-normalized
//!
//! The vocabulary is ordered lexicographically, so term indices (and the
//! order in which floats are summed) depend only on the input text.

use crate::tokenizer::tokenize;
use data_loader::{DataError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// A sparse document vector, entries sorted by term index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    pub(crate) entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from (term index, weight) pairs already sorted by index
    pub fn from_sorted(entries: Vec<(usize, f32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Dot product as a merge-join over sorted term indices.
    ///
    /// Products are summed in ascending term order whichever side is `self`,
    /// so `a.dot(b) == b.dot(a)` bit for bit.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            if ti == tj {
                sum += wi * wj;
                i += 1;
                j += 1;
            } else if ti < tj {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }
}

/// A fitted TF-IDF model: vocabulary, idf weights and one vector per document
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
}

impl TfIdfModel {
    /// Fit on a corpus of documents.
    ///
    /// Fails with [`DataError::EmptyVocabulary`] when no document yields a
    /// single term.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        if terms.is_empty() {
            return Err(DataError::EmptyVocabulary);
        }

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        // Term counts per document, keyed by term index so iteration is sorted
        let counts: Vec<BTreeMap<usize, u32>> = tokenized
            .iter()
            .map(|tokens| {
                let mut tf = BTreeMap::new();
                for token in tokens {
                    *tf.entry(vocabulary[token.as_str()]).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut df = vec![0u32; vocabulary.len()];
        for tf in &counts {
            for &idx in tf.keys() {
                df[idx] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f32> = df
            .iter()
            .map(|&df| (((1.0 + n) / (1.0 + df as f64)).ln() + 1.0) as f32)
            .collect();

        let vectors = counts
            .iter()
            .map(|tf| {
                let weighted: Vec<(usize, f32)> = tf
                    .iter()
                    .map(|(&idx, &count)| (idx, count as f32 * idf[idx]))
                    .collect();
                normalize(SparseVector::from_sorted(weighted))
            })
            .collect();

        Ok(Self {
            vocabulary,
            idf,
            vectors,
        })
    }

    /// Number of distinct terms
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column index of a term, if it is in the vocabulary
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Smoothed idf of a term
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_index(term).map(|idx| self.idf[idx])
    }

    /// Normalized document vectors in input order
    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }
}

/// Scale a vector to unit length; the zero vector stays zero
fn normalize(vector: SparseVector) -> SparseVector {
    let norm = vector.norm();
    if norm == 0.0 {
        return vector;
    }
    SparseVector {
        entries: vector
            .entries
            .into_iter()
            .map(|(idx, w)| (idx, w / norm))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothed_idf() {
        let model = TfIdfModel::fit(&["Animation|Comedy", "Adventure|Comedy"]).unwrap();

        // comedy is in both documents: ln(3/3) + 1
        assert!((model.idf("comedy").unwrap() - 1.0).abs() < 1e-6);
        // animation is in one: ln(3/2) + 1
        assert!((model.idf("animation").unwrap() - 1.405_465).abs() < 1e-5);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let model = TfIdfModel::fit(&["zombie comedy", "action"]).unwrap();
        assert_eq!(model.vocabulary_size(), 3);
        assert_eq!(model.term_index("action"), Some(0));
        assert_eq!(model.term_index("comedy"), Some(1));
        assert_eq!(model.term_index("zombie"), Some(2));
        assert_eq!(model.term_index("the"), None);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let model = TfIdfModel::fit(&["heist heist crime", "crime drama", "drama"]).unwrap();
        for vector in model.vectors() {
            assert!((vector.norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_term_frequency_is_raw_count() {
        let model = TfIdfModel::fit(&["heist heist crime", "crime"]).unwrap();
        let doc = &model.vectors()[0];
        let heist = model.term_index("heist").unwrap();
        let crime = model.term_index("crime").unwrap();

        let weight = |idx| doc.entries().iter().find(|(t, _)| *t == idx).unwrap().1;
        // heist: 2 * (ln(3/2) + 1), crime: 1 * 1
        let expected_ratio = 2.0 * 1.405_465;
        assert!((weight(heist) / weight(crime) - expected_ratio).abs() < 1e-4);
    }

    #[test]
    fn test_empty_document_has_zero_vector() {
        let model = TfIdfModel::fit(&["comedy", ""]).unwrap();
        assert!(model.vectors()[1].is_empty());
    }

    #[test]
    fn test_all_empty_documents_fail() {
        let err = TfIdfModel::fit(&["", "the of", "a"]).unwrap_err();
        assert!(matches!(err, DataError::EmptyVocabulary));
    }

    #[test]
    fn test_dot_is_symmetric() {
        let a = SparseVector::from_sorted(vec![(0, 0.3), (2, 0.5), (7, 0.1)]);
        let b = SparseVector::from_sorted(vec![(2, 0.25), (3, 0.9), (7, 0.4)]);
        assert_eq!(a.dot(&b), b.dot(&a));
        assert!((a.dot(&b) - (0.5 * 0.25 + 0.1 * 0.4)).abs() < 1e-7);
    }
}
