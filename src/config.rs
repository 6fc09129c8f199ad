use serde::Deserialize;
use std::time::Duration;

use crate::services::{
    mood::{DEFAULT_API_URL as GEMINI_API_URL, DEFAULT_MODEL},
    providers::{omdb, tmdb, tvmaze},
    search::SearchPolicy,
};

/// Application configuration loaded from environment variables.
///
/// A missing API key disables that upstream instead of failing startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDb v3 API key
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// OMDb API key
    pub omdb_api_key: Option<String>,

    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    #[serde(default = "default_tvmaze_api_url")]
    pub tvmaze_api_url: String,

    /// Watchmode API key
    pub watchmode_api_key: Option<String>,

    #[serde(default = "default_watchmode_api_url")]
    pub watchmode_api_url: String,

    /// Gemini API key; without it moods are classified by keywords only
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Per-call bound on every upstream request
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Comma separated, priority order
    #[serde(default = "default_languages")]
    pub default_languages: String,

    #[serde(default = "default_thin_results_threshold")]
    pub thin_results_threshold: usize,

    #[serde(default = "default_classics_year_cutoff")]
    pub classics_year_cutoff: i32,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_min_vote_average")]
    pub min_vote_average: f32,

    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: u32,
}

fn default_tmdb_api_url() -> String {
    tmdb::DEFAULT_API_URL.to_string()
}

fn default_tmdb_image_url() -> String {
    tmdb::DEFAULT_IMAGE_URL.to_string()
}

fn default_omdb_api_url() -> String {
    omdb::DEFAULT_API_URL.to_string()
}

fn default_tvmaze_api_url() -> String {
    tvmaze::DEFAULT_API_URL.to_string()
}

fn default_watchmode_api_url() -> String {
    crate::services::availability::DEFAULT_API_URL.to_string()
}

fn default_gemini_api_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cache_ttl_secs() -> u64 {
    15 * 60
}

fn default_cache_capacity() -> u64 {
    1_000
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_languages() -> String {
    "hi,en,es,it,de".to_string()
}

fn default_thin_results_threshold() -> usize {
    5
}

fn default_classics_year_cutoff() -> i32 {
    2000
}

fn default_max_results() -> usize {
    20
}

fn default_min_vote_average() -> f32 {
    7.0
}

fn default_min_vote_count() -> u32 {
    500
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn search_policy(&self) -> SearchPolicy {
        let default_languages: Vec<String> = self
            .default_languages
            .split(',')
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        SearchPolicy {
            default_languages,
            thin_results_threshold: self.thin_results_threshold,
            classics_year_cutoff: self.classics_year_cutoff,
            max_results: self.max_results,
        }
    }

    /// Shared client for every upstream
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.upstream_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
    }
}
