//! # Data Loader Crate
//!
//! This crate loads the MovieLens CSV tables and builds the movie corpus
//! the similarity engine is fitted on.
//!
//! ## Main Components
//!
//! - **types**: Raw row types, the joined `Movie` record and `Corpus`
//! - **parser**: Parse CSV files into row structs, validating headers
//! - **corpus**: Left-join ratings, tags and links onto the movie table
//! - **error**: `DataError`, the single build-time failure type
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Corpus, TextSource};
//! use std::path::Path;
//!
//! let corpus = Corpus::load_from_dir(Path::new("data/ml-latest-small"), TextSource::Genres)?;
//! let toy_story = corpus.get_movie(1).unwrap();
//! println!("{} has {} ratings", toy_story.title, toy_story.num_ratings);
//! ```

// Public modules
pub mod corpus;
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
pub use types::{
    // Type aliases
    MovieId,
    TmdbId,
    UserId,
    // Raw rows
    LinkRow,
    MovieRow,
    RatingRow,
    TagRow,
    // Joined types
    Corpus,
    Movie,
    TextSource,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_source_parsing() {
        assert_eq!("genres".parse::<TextSource>().unwrap(), TextSource::Genres);
        assert_eq!(
            "Title-Genres".parse::<TextSource>().unwrap(),
            TextSource::TitleGenres
        );
        assert_eq!("tags".parse::<TextSource>().unwrap(), TextSource::Tags);
        assert!("plot".parse::<TextSource>().is_err());
    }

    #[test]
    fn test_text_source_display_round_trips() {
        for source in [TextSource::Genres, TextSource::TitleGenres, TextSource::Tags] {
            assert_eq!(source.to_string().parse::<TextSource>().unwrap(), source);
        }
    }
}
