/// TMDb API source (primary catalog)
///
/// Discovery runs once per language; each discovered id is then resolved
/// through the details endpoint so runtime, spoken languages and the IMDb id
/// are known.
///
/// API Flow:
/// 1. Discover: /discover/{movie|tv} filtered by genre, language and era
/// 2. Details: /movie/{id} or /tv/{id}?append_to_response=external_ids
/// 3. IMDb lookups: /find/{imdb_id}?external_source=imdb_id
use futures::future::join_all;
use futures::FutureExt;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{genre::canonical_genre, ContentKind, PartialContent, SourceName},
    services::providers::{
        decode, join_variants, log_upstream_failure, normalize::non_empty, CatalogSource,
        SourceBatch, SourceId, SourceRequest, Variant,
    },
};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Clone)]
pub struct TmdbSource {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    image_url: String,
    min_vote_average: f32,
    min_vote_count: u32,
    timeout: Duration,
}

impl TmdbSource {
    /// A missing API key leaves the source in place but inert
    pub fn new(http_client: HttpClient, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url,
            image_url: DEFAULT_IMAGE_URL.to_string(),
            min_vote_average: 7.0,
            min_vote_count: 500,
            timeout: Duration::from_secs(10),
        }
    }

    /// Discover quality floor
    pub fn with_quality_floor(mut self, min_vote_average: f32, min_vote_count: u32) -> Self {
        self.min_vote_average = min_vote_average;
        self.min_vote_count = min_vote_count;
        self
    }

    pub fn with_image_url(mut self, image_url: String) -> Self {
        self.image_url = image_url;
        self
    }

    /// Upper bound for one language variant, details included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// TMDb numeric genre ids; unmapped genres are dropped from the query
    fn genre_id(kind: ContentKind, genre: &str) -> Option<u32> {
        let id = match (kind, genre) {
            (ContentKind::Movie, "action") => 28,
            (ContentKind::Movie, "adventure") => 12,
            (ContentKind::Movie, "science fiction") => 878,
            (ContentKind::Movie, "fantasy") => 14,
            (ContentKind::Movie, "war") => 10752,
            (ContentKind::Movie, "history") => 36,
            (ContentKind::Movie, "horror") => 27,
            (ContentKind::Movie, "music") => 10402,
            (ContentKind::Movie, "romance") => 10749,
            (ContentKind::Movie, "thriller") => 53,
            (ContentKind::Movie, "tv movie") => 10770,
            (ContentKind::Tv, "action" | "adventure") => 10759,
            (ContentKind::Tv, "science fiction" | "fantasy") => 10765,
            (ContentKind::Tv, "war") => 10768,
            (_, "animation") => 16,
            (_, "comedy") => 35,
            (_, "crime") => 80,
            (_, "documentary") => 99,
            (_, "drama") => 18,
            (_, "family") => 10751,
            (_, "mystery") => 9648,
            (_, "western") => 37,
            _ => return None,
        };
        Some(id)
    }

    fn with_genres(kind: ContentKind, request: &SourceRequest) -> String {
        let mut ids: Vec<u32> = Vec::new();
        for id in request.genres.iter().filter_map(|g| Self::genre_id(kind, g)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn image(&self, size: &str, path: Option<String>) -> Option<String> {
        non_empty(path).map(|p| format!("{}/{}{}", self.image_url, size, p))
    }

    /// One discover call plus details for every hit
    async fn discover(
        &self,
        api_key: &str,
        request: &SourceRequest,
        language: &str,
    ) -> AppResult<Vec<PartialContent>> {
        let kind = request.kind;
        let url = format!("{}/discover/{}", self.api_url, kind);
        let date_field = match kind {
            ContentKind::Movie => "primary_release_date",
            ContentKind::Tv => "first_air_date",
        };

        let mut params: Vec<(String, String)> = vec![
            ("api_key".to_string(), api_key.to_string()),
            ("with_original_language".to_string(), language.to_string()),
            (format!("{}.gte", date_field), format!("{}-01-01", request.years.from)),
            (format!("{}.lte", date_field), format!("{}-12-31", request.years.to)),
            ("vote_average.gte".to_string(), self.min_vote_average.to_string()),
            ("vote_count.gte".to_string(), self.min_vote_count.to_string()),
            ("sort_by".to_string(), "vote_average.desc".to_string()),
            ("page".to_string(), "1".to_string()),
        ];
        let genres = Self::with_genres(kind, request);
        if !genres.is_empty() {
            params.push(("with_genres".to_string(), genres));
        }

        let response = self.http_client.get(&url).query(&params).send().await?;
        let page: DiscoverPage = decode(SourceName::Tmdb, response).await?;

        let details = join_all(
            page.results
                .iter()
                .map(|hit| self.details(api_key, kind, hit.id)),
        )
        .await;

        let mut records = Vec::new();
        for (hit, result) in page.results.iter().zip(details) {
            match result {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => log_upstream_failure(SourceName::Tmdb, &format!("details {}", hit.id), &e),
            }
        }

        Ok(records)
    }

    /// `Ok(None)` on 404
    async fn details(
        &self,
        api_key: &str,
        kind: ContentKind,
        id: u64,
    ) -> AppResult<Option<PartialContent>> {
        let url = format!("{}/{}/{}", self.api_url, kind, id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("append_to_response", "external_ids")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record = match kind {
            ContentKind::Movie => {
                let details: TmdbMovieDetails = decode(SourceName::Tmdb, response).await?;
                self.movie_record(details)
            }
            ContentKind::Tv => {
                let details: TmdbTvDetails = decode(SourceName::Tmdb, response).await?;
                self.tv_record(details)
            }
        };

        Ok(Some(record))
    }

    /// Resolves an IMDb id to TMDb's numbering
    async fn find(&self, api_key: &str, kind: ContentKind, imdb_id: &str) -> AppResult<Option<u64>> {
        let url = format!("{}/find/{}", self.api_url, imdb_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("external_source", "imdb_id")])
            .send()
            .await?;

        let found: FindResponse = decode(SourceName::Tmdb, response).await?;
        let hits = match kind {
            ContentKind::Movie => found.movie_results,
            ContentKind::Tv => found.tv_results,
        };

        Ok(hits.first().map(|hit| hit.id))
    }

    fn movie_record(&self, details: TmdbMovieDetails) -> PartialContent {
        PartialContent {
            original_title: non_empty(details.original_title),
            overview: non_empty(details.overview),
            poster_path: self.image("w500", details.poster_path),
            backdrop_path: self.image("original", details.backdrop_path),
            release_date: non_empty(details.release_date),
            runtime: details.runtime.filter(|r| *r > 0),
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            genres: Some(
                details
                    .genres
                    .iter()
                    .map(|g| canonical_genre(&g.name))
                    .collect(),
            ),
            original_language: non_empty(details.original_language),
            spoken_languages: spoken(details.spoken_languages),
            external_id: non_empty(details.imdb_id),
            ..PartialContent::new(ContentKind::Movie, SourceName::Tmdb, details.id, details.title)
        }
    }

    fn tv_record(&self, details: TmdbTvDetails) -> PartialContent {
        let runtimes: Vec<u32> = details
            .episode_run_time
            .into_iter()
            .filter(|r| *r > 0)
            .collect();

        PartialContent {
            original_title: non_empty(details.original_name),
            overview: non_empty(details.overview),
            poster_path: self.image("w500", details.poster_path),
            backdrop_path: self.image("original", details.backdrop_path),
            release_date: non_empty(details.first_air_date),
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            genres: Some(
                details
                    .genres
                    .iter()
                    .map(|g| canonical_genre(&g.name))
                    .collect(),
            ),
            original_language: non_empty(details.original_language),
            spoken_languages: spoken(details.spoken_languages),
            external_id: details.external_ids.and_then(|ids| non_empty(ids.imdb_id)),
            number_of_seasons: details.number_of_seasons,
            number_of_episodes: details.number_of_episodes,
            episode_runtimes: (!runtimes.is_empty()).then_some(runtimes),
            status: non_empty(details.status),
            network: details
                .networks
                .into_iter()
                .next()
                .and_then(|n| non_empty(Some(n.name))),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tmdb, details.id, details.name)
        }
    }
}

fn spoken(languages: Vec<TmdbLanguage>) -> Option<Vec<String>> {
    let codes: Vec<String> = languages
        .into_iter()
        .filter_map(|l| non_empty(Some(l.iso_639_1)))
        .collect();
    (!codes.is_empty()).then_some(codes)
}

#[async_trait::async_trait]
impl CatalogSource for TmdbSource {
    fn name(&self) -> SourceName {
        SourceName::Tmdb
    }

    fn supports(&self, _kind: ContentKind) -> bool {
        true
    }

    async fn search(&self, request: &SourceRequest) -> SourceBatch {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(provider = "tmdb", "No API key configured, skipping");
            return SourceBatch::empty();
        };

        let variants: Vec<Variant<'_>> = request
            .languages
            .iter()
            .map(|language| {
                let label = format!("{} {}", request.kind, language);
                (label, self.discover(api_key, request, language).boxed())
            })
            .collect();

        join_variants(SourceName::Tmdb, self.timeout, variants).await
    }

    async fn fetch_by_id(
        &self,
        kind: ContentKind,
        id: &SourceId,
    ) -> AppResult<Option<PartialContent>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let tmdb_id = match id {
            SourceId::Local(id) => *id,
            SourceId::External(imdb_id) => match self.find(api_key, kind, imdb_id).await? {
                Some(id) => id,
                None => return Ok(None),
            },
        };

        self.details(api_key, kind, tmdb_id).await
    }
}

// ============================================================================
// TMDb API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct DiscoverPage {
    #[serde(default)]
    results: Vec<DiscoverHit>,
}

#[derive(Debug, Deserialize)]
struct DiscoverHit {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<DiscoverHit>,
    #[serde(default)]
    tv_results: Vec<DiscoverHit>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbLanguage {
    iso_639_1: String,
}

#[derive(Debug, Deserialize)]
struct TmdbNetwork {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIds {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u64,
    title: String,
    original_title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
    vote_count: Option<u64>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    original_language: Option<String>,
    #[serde(default)]
    spoken_languages: Vec<TmdbLanguage>,
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvDetails {
    id: u64,
    name: String,
    original_name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
    vote_count: Option<u64>,
    #[serde(default)]
    episode_run_time: Vec<u32>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    original_language: Option<String>,
    #[serde(default)]
    spoken_languages: Vec<TmdbLanguage>,
    number_of_seasons: Option<u32>,
    number_of_episodes: Option<u32>,
    status: Option<String>,
    #[serde(default)]
    networks: Vec<TmdbNetwork>,
    external_ids: Option<TmdbExternalIds>,
}
