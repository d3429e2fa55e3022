use serde::Deserialize;

/// TMDB settings loaded from `TMDB_*` environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TmdbConfig {
    /// TMDB v3 API key; posters are disabled without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Prefix joined with a movie's `poster_path`
    #[serde(default = "default_image_url")]
    pub image_url: String,
}

fn default_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            image_url: default_image_url(),
        }
    }
}

impl TmdbConfig {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs (`TMDB_API_KEY`, ...)
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config: TmdbConfig = envy::prefixed("TMDB_").from_iter(vars)?;
        // An empty key in .env means "no key"
        if config.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            config.api_key = None;
        }
        Ok(config)
    }

    pub fn posters_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
