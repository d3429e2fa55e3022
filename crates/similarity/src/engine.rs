//! The similarity engine: a fitted corpus plus its similarity matrix.
//!
//! ## Title resolution
//! A title query resolves to exactly one row:
//! 1. the first row (table order) whose title equals the query, ignoring case
//! 2. otherwise the first row whose title contains the query, ignoring case
//!
//! When several movies share a title the first one in table order wins.
//! This ambiguity is inherent to title lookup; query by id to avoid it.

use crate::matrix::SimilarityMatrix;
use crate::tfidf::TfIdfModel;
use crate::types::{MovieQuery, RankedMovie, SimilarMovie};
use data_loader::{Corpus, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Read-only after [`SimilarityEngine::fit`]; share it behind an `Arc`
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    corpus: Arc<Corpus>,
    matrix: SimilarityMatrix,
    vocabulary_size: usize,
}

impl SimilarityEngine {
    /// Vectorize every movie's text feature and build the similarity matrix
    #[instrument(skip(corpus), fields(movies = corpus.len(), text_source = %corpus.text_source()))]
    pub fn fit(corpus: Arc<Corpus>) -> Result<Self> {
        let start = Instant::now();

        let model = TfIdfModel::fit(&corpus.text_features())?;
        info!(
            vocabulary = model.vocabulary_size(),
            elapsed = ?start.elapsed(),
            "Fitted TF-IDF model"
        );

        let matrix = SimilarityMatrix::from_normalized(model.vectors());
        info!(
            rows = matrix.len(),
            megabytes = matrix.memory_bytes() / (1024 * 1024),
            elapsed = ?start.elapsed(),
            "Built similarity matrix"
        );

        Ok(Self {
            corpus,
            matrix,
            vocabulary_size: model.vocabulary_size(),
        })
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Resolve a query to a corpus row, `None` when nothing matches
    pub fn resolve(&self, query: &MovieQuery) -> Option<usize> {
        match query {
            MovieQuery::Id(id) => self.corpus.row_of(*id),
            MovieQuery::Title(title) => self.resolve_title(title),
        }
    }

    fn resolve_title(&self, title: &str) -> Option<usize> {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let movies = self.corpus.movies();
        movies
            .iter()
            .position(|m| m.title.to_lowercase() == needle)
            .or_else(|| {
                movies
                    .iter()
                    .position(|m| m.title.to_lowercase().contains(&needle))
            })
    }

    /// The `k` movies most similar to the query movie.
    ///
    /// Ordered by similarity descending, ties in table order. The query
    /// movie itself is never returned. An unresolved query gives an empty
    /// result.
    pub fn recommend_similar(&self, query: &MovieQuery, k: usize) -> Vec<SimilarMovie> {
        let Some(row) = self.resolve(query) else {
            debug!(?query, "No movie matches query");
            return Vec::new();
        };
        let Some(similarities) = self.matrix.row(row) else {
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32)> = similarities
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != row)
            .collect();

        // sort_by is stable: equal similarities keep table order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        ranked
            .into_iter()
            .filter_map(|(other, similarity)| {
                self.corpus
                    .get(other)
                    .map(|movie| SimilarMovie::new(other, movie, similarity))
            })
            .collect()
    }

    /// The `n` best-rated movies whose genre field contains `genre`.
    ///
    /// Matching is a case-insensitive substring test against the raw
    /// "A|B|C" field, so "fi" matches "Sci-Fi". Ordered by average rating
    /// then rating count, both descending, ties in table order.
    pub fn top_by_genre(&self, genre: &str, n: usize) -> Vec<RankedMovie> {
        let needle = genre.to_lowercase();

        let mut matches: Vec<(usize, &data_loader::Movie)> = self
            .corpus
            .movies()
            .iter()
            .enumerate()
            .filter(|(_, movie)| movie.genre_field().to_lowercase().contains(&needle))
            .collect();

        matches.sort_by(|(_, a), (_, b)| {
            b.avg_rating
                .total_cmp(&a.avg_rating)
                .then_with(|| b.num_ratings.cmp(&a.num_ratings))
        });
        matches.truncate(n);

        matches
            .into_iter()
            .map(|(row, movie)| RankedMovie::new(row, movie))
            .collect()
    }

    /// All movies whose title contains `title`, ignoring case, in table order
    pub fn search(&self, title: &str) -> Vec<RankedMovie> {
        let needle = title.to_lowercase();
        self.corpus
            .movies()
            .iter()
            .enumerate()
            .filter(|(_, movie)| movie.title.to_lowercase().contains(&needle))
            .map(|(row, movie)| RankedMovie::new(row, movie))
            .collect()
    }
}
