use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod feedback;
pub mod genre;
pub mod mood;
pub mod search;

pub use feedback::{Feedback, NewFeedback};
pub use mood::{Era, Mood, MoodInterpretation};
pub use search::{Region, RuntimeBounds, SearchOptions, SearchRequest, YearRange};

/// Kind of discoverable title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Movie, ContentKind::Tv];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Tv => "tv",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream catalog a record (or its id) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "TMDb", alias = "tmdb")]
    Tmdb,
    #[serde(rename = "OMDb", alias = "omdb")]
    Omdb,
    #[serde(rename = "TVmaze", alias = "tvmaze")]
    Tvmaze,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Tmdb => "TMDb",
            SourceName::Omdb => "OMDb",
            SourceName::Tvmaze => "TVmaze",
        }
    }
}

impl Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Unified content
// ============================================================================

/// Fields shared by movies and TV series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCore {
    /// Only unique within `id_source`'s numbering space
    pub id: u64,
    /// Catalog whose numbering `id` belongs to
    pub id_source: SourceName,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Always on a 0-10 scale
    pub vote_average: f32,
    pub vote_count: u64,
    pub genres: Vec<String>,
    pub original_language: String,
    pub spoken_languages: Option<Vec<String>>,
    /// Cross-source join key (IMDb id)
    pub external_id: Option<String>,
    /// Provenance: the non-primary catalog that filled in data, if any
    pub source_name: SourceName,
    pub cast: Option<Vec<String>>,
    pub director: Option<String>,
    pub writers: Option<Vec<String>>,
    pub awards_text: Option<String>,
    pub external_rating: Option<f32>,
    pub critic_rating: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(flatten)]
    pub core: ContentCore,
    pub release_date: String,
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvSeries {
    #[serde(flatten)]
    pub core: ContentCore,
    pub first_air_date: String,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_runtimes: Option<Vec<u32>>,
    pub status: Option<String>,
    pub network: Option<String>,
}

/// One discoverable title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum Content {
    Movie(Movie),
    Tv(TvSeries),
}

impl Content {
    pub fn core(&self) -> &ContentCore {
        match self {
            Content::Movie(movie) => &movie.core,
            Content::Tv(series) => &series.core,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Movie(_) => ContentKind::Movie,
            Content::Tv(_) => ContentKind::Tv,
        }
    }

    pub fn id(&self) -> u64 {
        self.core().id
    }

    pub fn title(&self) -> &str {
        &self.core().title
    }

    pub fn external_id(&self) -> Option<&str> {
        self.core().external_id.as_deref()
    }

    pub fn vote_average(&self) -> f32 {
        self.core().vote_average
    }

    /// Runtime in minutes; for series the first listed episode runtime
    pub fn runtime(&self) -> Option<u32> {
        match self {
            Content::Movie(movie) => movie.runtime,
            Content::Tv(series) => series
                .episode_runtimes
                .as_ref()
                .and_then(|runtimes| runtimes.first().copied()),
        }
    }

    /// Release date for movies, first air date for series
    pub fn date(&self) -> &str {
        match self {
            Content::Movie(movie) => &movie.release_date,
            Content::Tv(series) => &series.first_air_date,
        }
    }
}

// ============================================================================
// Partial records produced by catalog adapters
// ============================================================================

/// What one catalog knows about a title.
///
/// `None` means the catalog did not supply the field; `Some` is a supplied
/// value, even an empty one. The merge engine relies on that distinction.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialContent {
    pub kind: ContentKind,
    /// Catalog that supplied the field values
    pub source: SourceName,
    /// Catalog whose numbering `id` belongs to
    pub id_source: SourceName,
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Release date for movies, first air date for series
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<u64>,
    pub genres: Option<Vec<String>>,
    pub original_language: Option<String>,
    pub spoken_languages: Option<Vec<String>>,
    pub external_id: Option<String>,
    pub cast: Option<Vec<String>>,
    pub director: Option<String>,
    pub writers: Option<Vec<String>>,
    pub awards_text: Option<String>,
    pub external_rating: Option<f32>,
    pub critic_rating: Option<f32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_runtimes: Option<Vec<u32>>,
    pub status: Option<String>,
    pub network: Option<String>,
}

impl PartialContent {
    /// A record carrying only identity fields
    pub fn new(kind: ContentKind, source: SourceName, id: u64, title: impl Into<String>) -> Self {
        Self {
            kind,
            source,
            id_source: source,
            id,
            title: title.into(),
            original_title: None,
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            runtime: None,
            vote_average: None,
            vote_count: None,
            genres: None,
            original_language: None,
            spoken_languages: None,
            external_id: None,
            cast: None,
            director: None,
            writers: None,
            awards_text: None,
            external_rating: None,
            critic_rating: None,
            number_of_seasons: None,
            number_of_episodes: None,
            episode_runtimes: None,
            status: None,
            network: None,
        }
    }

    /// Release year parsed from the leading digits of the date
    pub fn year(&self) -> Option<i32> {
        self.release_date.as_deref().and_then(leading_year)
    }
}

impl From<&Content> for PartialContent {
    fn from(content: &Content) -> Self {
        let core = content.core();
        let mut partial = PartialContent {
            source: core.source_name,
            id_source: core.id_source,
            original_title: core.original_title.clone(),
            overview: Some(core.overview.clone()),
            poster_path: core.poster_path.clone(),
            backdrop_path: core.backdrop_path.clone(),
            vote_average: Some(core.vote_average),
            vote_count: Some(core.vote_count),
            genres: Some(core.genres.clone()),
            original_language: Some(core.original_language.clone()),
            spoken_languages: core.spoken_languages.clone(),
            external_id: core.external_id.clone(),
            cast: core.cast.clone(),
            director: core.director.clone(),
            writers: core.writers.clone(),
            awards_text: core.awards_text.clone(),
            external_rating: core.external_rating,
            critic_rating: core.critic_rating,
            ..PartialContent::new(content.kind(), core.source_name, core.id, core.title.clone())
        };

        match content {
            Content::Movie(movie) => {
                partial.release_date = Some(movie.release_date.clone());
                partial.runtime = movie.runtime;
            }
            Content::Tv(series) => {
                partial.release_date = Some(series.first_air_date.clone());
                partial.number_of_seasons = series.number_of_seasons;
                partial.number_of_episodes = series.number_of_episodes;
                partial.episode_runtimes = series.episode_runtimes.clone();
                partial.status = series.status.clone();
                partial.network = series.network.clone();
            }
        }

        partial
    }
}

/// Parses the year out of "1972-03-24", "1972" or "1972–1980"
pub fn leading_year(date: &str) -> Option<i32> {
    let digits: String = date.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

// ============================================================================
// Streaming availability
// ============================================================================

/// One place a title can be watched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingSource {
    pub name: String,
    /// subscription, rent, buy, free...
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_url: Option<String>,
}

/// Per-title cache entry, filled by searches and availability lookups
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTitle {
    pub content: Content,
    pub streaming_sources: Option<Vec<StreamingSource>>,
    pub cached_at: DateTime<Utc>,
}

// ============================================================================
// Watchmode API Types
// ============================================================================

/// Watchmode search result (IMDb id → Watchmode id lookup)
#[derive(Debug, Clone, Deserialize)]
pub struct WatchmodeTitle {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Watchmode search response
#[derive(Debug, Deserialize)]
pub struct WatchmodeSearchResponse {
    #[serde(default)]
    pub title_results: Vec<WatchmodeTitle>,
}

/// Watchmode streaming source
#[derive(Debug, Clone, Deserialize)]
pub struct WatchmodeSource {
    pub source_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub region: Option<String>,
    pub web_url: Option<String>,
    #[serde(default)]
    pub ios_url: Option<String>,
    #[serde(default)]
    pub android_url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl From<WatchmodeSource> for StreamingSource {
    fn from(source: WatchmodeSource) -> Self {
        StreamingSource {
            name: source.name,
            source_type: source.source_type,
            web_url: source.web_url,
            ios_url: source.ios_url,
            android_url: source.android_url,
        }
    }
}
