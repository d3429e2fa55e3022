//! Core domain types for the movie corpus.
//!
//! Two layers live here:
//! - raw rows, one struct per input table, deserialized straight from CSV
//! - the joined [`Movie`] record and the [`Corpus`] that owns them in table order

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie, stable across all input tables
pub type MovieId = u32;

/// Identifier of a user who rated or tagged a movie
pub type UserId = u32;

/// Foreign identifier used to look up poster images on TMDB
pub type TmdbId = u32;

// =============================================================================
// Raw input rows
// =============================================================================

/// One row of `movies.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRow {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
    /// Pipe-separated genre tags, e.g. "Animation|Children|Comedy"
    #[serde(default)]
    pub genres: String,
}

/// One row of `ratings.csv`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRow {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub rating: f32,
}

/// One row of `tags.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRow {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    #[serde(default)]
    pub tag: String,
}

/// One row of `links.csv`
///
/// `tmdbId` is blank for a handful of MovieLens titles, hence the `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkRow {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    #[serde(rename = "tmdbId")]
    pub tmdb_id: Option<TmdbId>,
}

// =============================================================================
// Text source selection
// =============================================================================

/// Which text gets vectorized for each movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextSource {
    /// The raw genre field
    #[default]
    Genres,
    /// Title followed by the raw genre field
    TitleGenres,
    /// All user tags attached to the movie, space-joined in file order
    Tags,
}

impl TextSource {
    /// Whether building this text feature needs `tags.csv`
    pub fn needs_tags(&self) -> bool {
        matches!(self, TextSource::Tags)
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextSource::Genres => "genres",
            TextSource::TitleGenres => "title-genres",
            TextSource::Tags => "tags",
        };
        f.write_str(name)
    }
}

impl FromStr for TextSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "genres" => Ok(TextSource::Genres),
            "title-genres" | "title_genres" => Ok(TextSource::TitleGenres),
            "tags" => Ok(TextSource::Tags),
            other => Err(format!(
                "unknown text source '{other}' (expected genres, title-genres or tags)"
            )),
        }
    }
}

// =============================================================================
// Joined movie record
// =============================================================================

/// One row of the working table: a movie after all joins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Genre tags in source order
    pub genres: Vec<String>,
    /// The string that gets tokenized and vectorized
    pub text_feature: String,
    /// Mean of all ratings, `0.0` when the movie has none
    pub avg_rating: f32,
    /// Number of ratings, `0` when the movie has none
    pub num_ratings: u32,
    /// TMDB id for poster lookup, when `links.csv` maps one
    pub tmdb_id: Option<TmdbId>,
}

impl Movie {
    /// The genre field as it appears in the source table ("A|B|C")
    pub fn genre_field(&self) -> String {
        self.genres.join("|")
    }
}

// =============================================================================
// Corpus - the dense movie table
// =============================================================================

/// The dense, immutable movie table.
///
/// Row `i` here is row `i` of the similarity matrix; nothing may reorder
/// `movies` after construction.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub(crate) movies: Vec<Movie>,
    pub(crate) text_source: TextSource,
    /// movie id -> row position
    pub(crate) rows_by_id: HashMap<MovieId, usize>,
}

impl Corpus {
    /// Number of movies (N)
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// All movies in row order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Movie at a row position
    pub fn get(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    /// Row position of a movie id
    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.rows_by_id.get(&id).copied()
    }

    /// Get a movie by id
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.row_of(id).and_then(|row| self.movies.get(row))
    }

    /// The text source the feature column was built from
    pub fn text_source(&self) -> TextSource {
        self.text_source
    }

    /// Text features in row order, ready for vectorization
    pub fn text_features(&self) -> Vec<&str> {
        self.movies.iter().map(|m| m.text_feature.as_str()).collect()
    }

    /// Sorted unique individual genre tags
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self
            .movies
            .iter()
            .flat_map(|m| m.genres.iter().cloned())
            .collect();
        genres.sort();
        genres.dedup();
        genres
    }

    /// Sorted unique titles
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.movies.iter().map(|m| m.title.clone()).collect();
        titles.sort();
        titles.dedup();
        titles
    }
}
