//! # Recommendation Service
//!
//! Owns everything a query needs for the life of the process:
//! 1. the corpus and its fitted similarity engine (built once, read-only)
//! 2. an optional poster source
//!
//! Queries run the engine synchronously, then look up one poster per result
//! in order. Poster outcomes are carried on each result and never turn into
//! query errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use data_loader::{Corpus, MovieId, TextSource, TmdbId};
use posters::{PosterLookup, PosterSource};
use similarity::{MovieQuery, RankedMovie, SimilarMovie, SimilarityEngine};

/// Knobs that used to be separate copies of the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Which text gets vectorized
    pub text_source: TextSource,
    /// Default number of similar movies
    pub similar_k: usize,
    /// Default number of top movies per genre
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text_source: TextSource::Genres,
            similar_k: 5,
            top_n: 10,
        }
    }
}

/// A result row as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub avg_rating: f32,
    pub num_ratings: u32,
    pub tmdb_id: Option<TmdbId>,
    /// Similarity to the query movie; `None` for genre rankings
    pub similarity: Option<f32>,
    pub poster: PosterLookup,
}

impl MovieRecommendation {
    fn from_similar(movie: SimilarMovie, poster: PosterLookup) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title,
            genres: movie.genres,
            avg_rating: movie.avg_rating,
            num_ratings: movie.num_ratings,
            tmdb_id: movie.tmdb_id,
            similarity: Some(movie.similarity),
            poster,
        }
    }

    fn from_ranked(movie: RankedMovie, poster: PosterLookup) -> Self {
        Self {
            movie_id: movie.movie_id,
            title: movie.title,
            genres: movie.genres,
            avg_rating: movie.avg_rating,
            num_ratings: movie.num_ratings,
            tmdb_id: movie.tmdb_id,
            similarity: None,
            poster,
        }
    }
}

/// Long-lived service handle; clones share the same engine
#[derive(Clone)]
pub struct RecommendationService {
    engine: Arc<SimilarityEngine>,
    posters: Option<Arc<dyn PosterSource>>,
    config: EngineConfig,
}

impl RecommendationService {
    /// Fit the engine on an already built corpus
    pub fn new(
        corpus: Corpus,
        config: EngineConfig,
        posters: Option<Arc<dyn PosterSource>>,
    ) -> Result<Self> {
        if corpus.text_source() != config.text_source {
            warn!(
                corpus = %corpus.text_source(),
                configured = %config.text_source,
                "Corpus text source differs from configuration; using the corpus"
            );
        }

        let engine = SimilarityEngine::fit(Arc::new(corpus))
            .context("Failed to build similarity engine")?;

        Ok(Self {
            engine: Arc::new(engine),
            posters,
            config,
        })
    }

    /// Load the tables from `data_dir` and fit the engine.
    ///
    /// Parsing and fitting are CPU-bound and run on the blocking pool.
    pub async fn load(
        data_dir: impl AsRef<Path>,
        config: EngineConfig,
        posters: Option<Arc<dyn PosterSource>>,
    ) -> Result<Self> {
        let start = Instant::now();
        let data_dir: PathBuf = data_dir.as_ref().to_path_buf();

        let service = tokio::task::spawn_blocking(move || -> Result<Self> {
            let corpus = Corpus::load_from_dir(&data_dir, config.text_source)
                .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?;
            Self::new(corpus, config, posters)
        })
        .await
        .context("Engine build task panicked")??;

        info!(
            movies = service.engine.corpus().len(),
            elapsed = ?start.elapsed(),
            "Recommendation service ready"
        );
        Ok(service)
    }

    pub fn engine(&self) -> &Arc<SimilarityEngine> {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn posters_enabled(&self) -> bool {
        self.posters.is_some()
    }

    /// Movies most similar to the query; empty when it matches nothing
    pub async fn similar(
        &self,
        query: &MovieQuery,
        k: Option<usize>,
    ) -> Vec<MovieRecommendation> {
        let k = k.unwrap_or(self.config.similar_k);
        let results = self.engine.recommend_similar(query, k);
        info!(?query, k, results = results.len(), "Similarity query");

        let mut recommendations = Vec::with_capacity(results.len());
        for movie in results {
            let poster = self.lookup_poster(movie.tmdb_id).await;
            recommendations.push(MovieRecommendation::from_similar(movie, poster));
        }
        recommendations
    }

    /// Best-rated movies of a genre; empty when no genre field matches
    pub async fn top_by_genre(&self, genre: &str, n: Option<usize>) -> Vec<MovieRecommendation> {
        let n = n.unwrap_or(self.config.top_n);
        let results = self.engine.top_by_genre(genre, n);
        info!(genre, n, results = results.len(), "Genre query");

        let mut recommendations = Vec::with_capacity(results.len());
        for movie in results {
            let poster = self.lookup_poster(movie.tmdb_id).await;
            recommendations.push(MovieRecommendation::from_ranked(movie, poster));
        }
        recommendations
    }

    /// Sorted unique genre tags, for a genre picker
    pub fn genres(&self) -> Vec<String> {
        self.engine.corpus().genres()
    }

    /// Sorted unique titles, for a title picker
    pub fn titles(&self) -> Vec<String> {
        self.engine.corpus().titles()
    }

    /// Title substring search, no posters
    pub fn search(&self, title: &str) -> Vec<RankedMovie> {
        self.engine.search(title)
    }

    async fn lookup_poster(&self, tmdb_id: Option<TmdbId>) -> PosterLookup {
        match (&self.posters, tmdb_id) {
            (Some(source), Some(id)) => source.poster_url(id).await,
            _ => PosterLookup::NotFound,
        }
    }
}
