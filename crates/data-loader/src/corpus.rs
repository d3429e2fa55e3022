//! Corpus building: the relational joins that turn raw tables into the
//! dense movie table.
//!
//! - left joins anchored on the movie table (no row dropped or duplicated)
//! - per-movie rating mean and count, zero-filled when absent
//! - per-movie tag concatenation, empty when absent
//! - first-wins TMDB link per movie

use crate::error::{DataError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Running sum for one movie's ratings
#[derive(Debug, Default, Clone, Copy)]
struct RatingAccumulator {
    total: f64,
    count: u32,
}

impl RatingAccumulator {
    fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.total / self.count as f64) as f32
        }
    }
}

impl Corpus {
    /// Load the CSV tables from a directory and build the corpus
    ///
    /// `movies.csv` and `ratings.csv` are required. `tags.csv` is required
    /// only for [`TextSource::Tags`]; `links.csv` is optional.
    pub fn load_from_dir(data_dir: &Path, text_source: TextSource) -> Result<Self> {
        info!(data_dir = %data_dir.display(), %text_source, "Loading movie tables");
        let start = Instant::now();

        let movies_path = data_dir.join("movies.csv");
        let ratings_path = data_dir.join("ratings.csv");
        let tags_path = data_dir.join("tags.csv");
        let links_path = data_dir.join("links.csv");

        // Parse the four tables in parallel; movies+ratings on one side,
        // tags+links on the other
        let ((movies, ratings), (tags, links)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_movies(&movies_path),
                    || parser::parse_ratings(&ratings_path),
                )
            },
            || {
                rayon::join(
                    || {
                        if text_source.needs_tags() {
                            parser::parse_tags(&tags_path).map(Some)
                        } else {
                            Ok(None)
                        }
                    },
                    || {
                        if links_path.exists() {
                            parser::parse_links(&links_path).map(Some)
                        } else {
                            Ok(None)
                        }
                    },
                )
            },
        );

        let movies = movies?;
        let ratings = ratings?;
        let tags = tags?;
        let links = links?;

        info!(
            movies = movies.len(),
            ratings = ratings.len(),
            tags = tags.as_ref().map_or(0, Vec::len),
            links = links.as_ref().map_or(0, Vec::len),
            elapsed = ?start.elapsed(),
            "Parsed input tables"
        );

        Self::build(movies, &ratings, tags.as_deref(), links.as_deref(), text_source)
    }

    /// Join raw tables into the dense movie table.
    ///
    /// Row order of the result is the order of `movies`.
    pub fn build(
        movies: Vec<MovieRow>,
        ratings: &[RatingRow],
        tags: Option<&[TagRow]>,
        links: Option<&[LinkRow]>,
        text_source: TextSource,
    ) -> Result<Self> {
        if movies.is_empty() {
            return Err(DataError::EmptyMovieTable);
        }

        let mut rows_by_id: HashMap<MovieId, usize> = HashMap::with_capacity(movies.len());
        for (row, movie) in movies.iter().enumerate() {
            if rows_by_id.insert(movie.movie_id, row).is_some() {
                return Err(DataError::DuplicateMovie { id: movie.movie_id });
            }
        }

        let rating_stats = aggregate_ratings(ratings, &rows_by_id)?;
        let tag_text = match tags {
            Some(tags) => aggregate_tags(tags, &rows_by_id),
            None => HashMap::new(),
        };
        let tmdb_ids = match links {
            Some(links) => first_links(links, &rows_by_id),
            None => HashMap::new(),
        };

        let movies: Vec<Movie> = movies
            .into_iter()
            .map(|row| {
                let stats = rating_stats.get(&row.movie_id).copied().unwrap_or_default();
                let text_feature = match text_source {
                    TextSource::Genres => row.genres.clone(),
                    TextSource::TitleGenres => format!("{} {}", row.title, row.genres),
                    TextSource::Tags => tag_text.get(&row.movie_id).cloned().unwrap_or_default(),
                };

                Movie {
                    id: row.movie_id,
                    genres: parser::split_genres(&row.genres),
                    title: row.title,
                    text_feature,
                    avg_rating: stats.mean(),
                    num_ratings: stats.count,
                    tmdb_id: tmdb_ids.get(&row.movie_id).copied().flatten(),
                }
            })
            .collect();

        info!(
            movies = movies.len(),
            rated = rating_stats.len(),
            %text_source,
            "Corpus built"
        );

        Ok(Corpus {
            movies,
            text_source,
            rows_by_id,
        })
    }
}

/// Group ratings by movie id, skipping ids that aren't in the movie table
fn aggregate_ratings(
    ratings: &[RatingRow],
    rows_by_id: &HashMap<MovieId, usize>,
) -> Result<HashMap<MovieId, RatingAccumulator>> {
    let mut stats: HashMap<MovieId, RatingAccumulator> = HashMap::new();
    let mut orphans = 0usize;

    for rating in ratings {
        if !rating.rating.is_finite() || rating.rating < 0.0 {
            return Err(DataError::InvalidValue {
                field: "rating".to_string(),
                value: rating.rating.to_string(),
            });
        }
        if !rows_by_id.contains_key(&rating.movie_id) {
            orphans += 1;
            continue;
        }
        let entry = stats.entry(rating.movie_id).or_default();
        entry.total += rating.rating as f64;
        entry.count += 1;
    }

    if orphans > 0 {
        debug!(orphans, "Ignored ratings for movies missing from the movie table");
    }
    Ok(stats)
}

/// Concatenate tags per movie with single spaces, in source order
fn aggregate_tags(
    tags: &[TagRow],
    rows_by_id: &HashMap<MovieId, usize>,
) -> HashMap<MovieId, String> {
    let mut text: HashMap<MovieId, String> = HashMap::new();
    let mut orphans = 0usize;

    for tag in tags {
        if !rows_by_id.contains_key(&tag.movie_id) {
            orphans += 1;
            continue;
        }
        text.entry(tag.movie_id)
            .and_modify(|joined| {
                joined.push(' ');
                joined.push_str(&tag.tag);
            })
            .or_insert_with(|| tag.tag.clone());
    }

    if orphans > 0 {
        debug!(orphans, "Ignored tags for movies missing from the movie table");
    }
    text
}

/// Keep the first link row per known movie
fn first_links(
    links: &[LinkRow],
    rows_by_id: &HashMap<MovieId, usize>,
) -> HashMap<MovieId, Option<TmdbId>> {
    let mut ids = HashMap::new();
    for link in links {
        if rows_by_id.contains_key(&link.movie_id) {
            ids.entry(link.movie_id).or_insert(link.tmdb_id);
        }
    }
    ids
}
