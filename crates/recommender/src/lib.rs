//! Recommender crate for the movie similarity demo.
//!
//! This crate contains the long-lived service that owns the corpus, the
//! fitted similarity engine and the poster source, and answers queries for
//! the presentation layer.

pub mod service;

pub use service::{EngineConfig, MovieRecommendation, RecommendationService};
