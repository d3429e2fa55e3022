//! Error types for the data-loader crate.
//!
//! Every variant is a build-time failure: the corpus is either built
//! completely or not at all, there is no partially loaded state.

use thiserror::Error;

/// Errors that can occur while loading input tables or building the corpus
///
/// The similarity crate reuses this type for its own build step, so a caller
/// only ever has to handle one error kind during startup.
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record in a CSV file couldn't be parsed
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A column the join depends on is absent from the header row
    #[error("Missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// The movie table has no rows
    #[error("Movie table is empty")]
    EmptyMovieTable,

    /// The same movie id appears twice in the movie table
    #[error("Duplicate movie id {id} in movie table")]
    DuplicateMovie { id: u32 },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Every text feature tokenized to nothing
    #[error("Empty vocabulary: no text feature contains a usable term")]
    EmptyVocabulary,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataError>;
