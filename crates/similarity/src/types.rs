//! Query inputs and result rows for the similarity engine.

use data_loader::{Movie, MovieId, TmdbId};
use serde::{Deserialize, Serialize};

/// How a caller names the movie to find neighbours for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovieQuery {
    /// Resolved by title, see [`crate::SimilarityEngine::resolve`]
    Title(String),
    /// Resolved by movie id
    Id(MovieId),
}

impl From<&str> for MovieQuery {
    fn from(title: &str) -> Self {
        MovieQuery::Title(title.to_string())
    }
}

impl From<MovieId> for MovieQuery {
    fn from(id: MovieId) -> Self {
        MovieQuery::Id(id)
    }
}

/// One nearest-neighbour result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMovie {
    /// Corpus row of the recommended movie
    pub row: usize,
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub avg_rating: f32,
    pub num_ratings: u32,
    pub tmdb_id: Option<TmdbId>,
    /// Cosine similarity to the query movie
    pub similarity: f32,
}

impl SimilarMovie {
    pub(crate) fn new(row: usize, movie: &Movie, similarity: f32) -> Self {
        Self {
            row,
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            avg_rating: movie.avg_rating,
            num_ratings: movie.num_ratings,
            tmdb_id: movie.tmdb_id,
            similarity,
        }
    }
}

/// One top-by-genre result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMovie {
    pub row: usize,
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub avg_rating: f32,
    pub num_ratings: u32,
    pub tmdb_id: Option<TmdbId>,
}

impl RankedMovie {
    pub(crate) fn new(row: usize, movie: &Movie) -> Self {
        Self {
            row,
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            avg_rating: movie.avg_rating,
            num_ratings: movie.num_ratings,
            tmdb_id: movie.tmdb_id,
        }
    }
}
