//! # Similarity Crate
//!
//! Content-based similarity over the movie corpus.
//!
//! ## Components
//!
//! - **tokenizer**: lowercase word splitting with English stop-word removal
//! - **tfidf**: smoothed TF-IDF weighting into L2-normalized sparse vectors
//! - **matrix**: dense all-pairs cosine similarity, built in parallel
//! - **engine**: `SimilarityEngine` answering the two query shapes
//!   - nearest neighbours of a movie (`recommend_similar`)
//!   - best-rated movies of a genre (`top_by_genre`)
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Corpus, TextSource};
//! use similarity::{MovieQuery, SimilarityEngine};
//! use std::sync::Arc;
//!
//! let corpus = Arc::new(Corpus::load_from_dir("data/sample".as_ref(), TextSource::Genres)?);
//! let engine = SimilarityEngine::fit(corpus)?;
//!
//! for rec in engine.recommend_similar(&MovieQuery::from("Toy Story"), 5) {
//!     println!("{} ({:.3})", rec.title, rec.similarity);
//! }
//! ```

pub mod engine;
pub mod matrix;
pub mod tfidf;
pub mod tokenizer;
pub mod types;

// Re-export main types
pub use engine::SimilarityEngine;
pub use matrix::SimilarityMatrix;
pub use tfidf::{SparseVector, TfIdfModel};
pub use types::{MovieQuery, RankedMovie, SimilarMovie};
