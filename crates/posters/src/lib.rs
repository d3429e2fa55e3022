//! Poster lookup against a third-party movie metadata API.
//!
//! A lookup is best-effort and never fails the caller: every outcome is a
//! [`PosterLookup`] value. "This movie has no poster" ([`PosterLookup::NotFound`])
//! is kept apart from "the service could not answer"
//! ([`PosterLookup::Unavailable`]) even though a UI may render both the same.

pub mod config;
pub mod tmdb;

pub use config::TmdbConfig;
pub use tmdb::TmdbClient;

use async_trait::async_trait;
use serde::Serialize;

/// Outcome of one poster lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PosterLookup {
    /// Full image URL
    Found(String),
    /// The movie has no poster, no external id, or lookups are disabled
    NotFound,
    /// The lookup failed; the reason is for logs only
    Unavailable(String),
}

impl PosterLookup {
    /// Image URL, if one was found
    pub fn url(&self) -> Option<&str> {
        match self {
            PosterLookup::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Something that can turn a TMDB id into a poster URL.
///
/// Implementations must map every failure into the returned value; one
/// attempt per call, no retry.
#[async_trait]
pub trait PosterSource: Send + Sync {
    async fn poster_url(&self, tmdb_id: u32) -> PosterLookup;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_only_for_found() {
        assert_eq!(
            PosterLookup::Found("http://img/p.jpg".to_string()).url(),
            Some("http://img/p.jpg")
        );
        assert_eq!(PosterLookup::NotFound.url(), None);
        assert_eq!(PosterLookup::Unavailable("timeout".to_string()).url(), None);
    }
}
