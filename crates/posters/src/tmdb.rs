//! TMDB client for poster lookup.
//!
//! API Flow: `GET {api_url}/movie/{tmdb_id}?api_key=...&language=en-US`
//! returns movie details whose `poster_path` is joined onto the image base URL.

use crate::{PosterLookup, PosterSource, TmdbConfig};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors internal to a single TMDB request
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("TMDB returned status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
}

impl TmdbClient {
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: api_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            image_url: image_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from config, `None` when no API key is set
    pub fn from_config(config: &TmdbConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.api_url.clone(), config.image_url.clone()))
    }

    /// Fetch the poster path for a movie; `Ok(None)` means TMDB has no poster
    async fn fetch_poster_path(&self, tmdb_id: u32) -> Result<Option<String>, PosterError> {
        let url = format!("{}/movie/{}", self.api_url, tmdb_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let details: MovieDetails = response.json().await?;
                Ok(details.poster_path.filter(|path| !path.trim().is_empty()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(PosterError::Status(status)),
        }
    }

    fn image_url_for(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{}", self.image_url, poster_path)
        } else {
            format!("{}/{}", self.image_url, poster_path)
        }
    }
}

#[async_trait]
impl PosterSource for TmdbClient {
    async fn poster_url(&self, tmdb_id: u32) -> PosterLookup {
        match self.fetch_poster_path(tmdb_id).await {
            Ok(Some(path)) => PosterLookup::Found(self.image_url_for(&path)),
            Ok(None) => {
                debug!(tmdb_id, "No poster on TMDB");
                PosterLookup::NotFound
            }
            Err(e) => {
                warn!(tmdb_id, error = %e, "Poster lookup unavailable");
                PosterLookup::Unavailable(e.to_string())
            }
        }
    }
}
