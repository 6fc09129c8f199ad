/// OMDb API source (secondary catalog, classic films)
///
/// OMDb has no genre discovery, so searches go through a small table of
/// well-known titles per genre. Each keyword search yields IMDb ids which are
/// then looked up in full for credits, awards and critic scores.
use chrono::NaiveDate;
use futures::future::join_all;
use futures::FutureExt;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{genre::canonical_genre, leading_year, ContentKind, PartialContent, SourceName},
    services::providers::{
        decode, join_variants, log_upstream_failure,
        normalize::{
            language_code, leading_number, normalize_rating, not_available, parse_count,
            split_list,
        },
        CatalogSource, SourceBatch, SourceId, SourceRequest, Variant,
    },
};

pub const DEFAULT_API_URL: &str = "https://www.omdbapi.com";

/// Hits kept per keyword search
const HITS_PER_KEYWORD: usize = 2;

#[derive(Clone)]
pub struct OmdbSource {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    timeout: Duration,
}

impl OmdbSource {
    pub fn new(http_client: HttpClient, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classic titles searched for each genre
    fn classic_keywords(genre: &str) -> &'static [&'static str] {
        match genre {
            "drama" => &["godfather", "casablanca", "citizen kane"],
            "romance" => &["gone with the wind", "roman holiday", "breakfast at tiffanys"],
            "action" => &["die hard", "terminator", "rambo"],
            "comedy" => &["some like it hot", "it happened one night", "the graduate"],
            _ => &[],
        }
    }

    /// Keyword search, then full lookups for the first hits inside the era
    async fn search_keyword(
        &self,
        api_key: &str,
        keyword: &str,
        request: &SourceRequest,
    ) -> AppResult<Vec<PartialContent>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", api_key), ("s", keyword), ("type", "movie")])
            .send()
            .await?;

        let found: OmdbSearchResponse = decode(SourceName::Omdb, response).await?;
        let hits = match found.into_result()? {
            Some(hits) => hits,
            None => return Ok(Vec::new()),
        };

        let lookups = join_all(
            hits.iter()
                .take(HITS_PER_KEYWORD)
                .map(|hit| self.lookup(api_key, &hit.imdb_id)),
        )
        .await;

        let mut records = Vec::new();
        for (hit, lookup) in hits.iter().zip(lookups) {
            match lookup {
                Ok(Some(record)) => {
                    if record.year().is_some_and(|year| request.years.contains(year)) {
                        records.push(record);
                    }
                }
                Ok(None) => {}
                Err(e) => log_upstream_failure(
                    SourceName::Omdb,
                    &format!("lookup {}", hit.imdb_id),
                    &e,
                ),
            }
        }

        Ok(records)
    }

    /// Full record by IMDb id; series and unknown ids are `None`
    async fn lookup(&self, api_key: &str, imdb_id: &str) -> AppResult<Option<PartialContent>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", api_key), ("i", imdb_id), ("plot", "full")])
            .send()
            .await?;

        let title: OmdbTitle = decode(SourceName::Omdb, response).await?;
        if !title.response.eq_ignore_ascii_case("true") {
            return match title.error.as_deref() {
                Some(error) if is_quota_error(error) => Err(AppError::RateLimited(error.to_string())),
                _ => Ok(None),
            };
        }

        if !title.kind.eq_ignore_ascii_case("movie") {
            return Ok(None);
        }

        Ok(title.into_record())
    }
}

fn is_quota_error(message: &str) -> bool {
    message.to_lowercase().contains("limit")
}

/// "tt0068646" -> 68646
fn imdb_number(imdb_id: &str) -> Option<u64> {
    imdb_id.trim().strip_prefix("tt")?.parse().ok()
}

/// "14 Mar 1972" -> "1972-03-14"
fn iso_date(released: &str) -> Option<String> {
    NaiveDate::parse_from_str(not_available(released)?, "%d %b %Y")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

#[async_trait::async_trait]
impl CatalogSource for OmdbSource {
    fn name(&self) -> SourceName {
        SourceName::Omdb
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Movie
    }

    async fn search(&self, request: &SourceRequest) -> SourceBatch {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(provider = "omdb", "No API key configured, skipping");
            return SourceBatch::empty();
        };

        if !self.supports(request.kind) {
            return SourceBatch::empty();
        }

        let variants: Vec<Variant<'_>> = request
            .genres
            .iter()
            .flat_map(|genre| Self::classic_keywords(genre).iter())
            .map(|keyword| {
                (
                    keyword.to_string(),
                    self.search_keyword(api_key, keyword, request).boxed(),
                )
            })
            .collect();

        join_variants(SourceName::Omdb, self.timeout, variants).await
    }

    async fn fetch_by_id(
        &self,
        kind: ContentKind,
        id: &SourceId,
    ) -> AppResult<Option<PartialContent>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };
        if !self.supports(kind) {
            return Ok(None);
        }

        let imdb_id = match id {
            SourceId::Local(number) => format!("tt{:07}", number),
            SourceId::External(imdb_id) => imdb_id.clone(),
        };

        self.lookup(api_key, &imdb_id).await
    }
}

// ============================================================================
// OMDb API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchHit>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbSearchResponse {
    /// OMDb reports "no hits" and quota exhaustion as a 200 with `Response: False`
    fn into_result(self) -> AppResult<Option<Vec<OmdbSearchHit>>> {
        if self.response.eq_ignore_ascii_case("true") {
            return Ok(Some(self.search));
        }
        match self.error {
            Some(error) if is_quota_error(&error) => Err(AppError::RateLimited(error)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmdbSearchHit {
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmdbTitle {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Released")]
    released: String,
    #[serde(rename = "Runtime")]
    runtime: String,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "Director")]
    director: String,
    #[serde(rename = "Writer")]
    writer: String,
    #[serde(rename = "Actors")]
    actors: String,
    #[serde(rename = "Plot")]
    plot: String,
    #[serde(rename = "Language")]
    language: String,
    #[serde(rename = "Awards")]
    awards: String,
    #[serde(rename = "Poster")]
    poster: String,
    #[serde(rename = "Ratings")]
    ratings: Vec<OmdbRating>,
    #[serde(rename = "imdbRating")]
    imdb_rating: String,
    #[serde(rename = "imdbVotes")]
    imdb_votes: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbTitle {
    fn rating(&self, source: &str) -> Option<f32> {
        self.ratings
            .iter()
            .find(|r| r.source == source)
            .and_then(|r| normalize_rating(&r.value))
    }

    fn into_record(self) -> Option<PartialContent> {
        let id = imdb_number(&self.imdb_id)?;
        let imdb_rating = normalize_rating(&self.imdb_rating);
        let critic_rating = self
            .rating("Rotten Tomatoes")
            .or_else(|| self.rating("Metacritic"));
        let languages: Vec<String> = split_list(&self.language)
            .unwrap_or_default()
            .iter()
            .filter_map(|name| language_code(name))
            .map(str::to_string)
            .collect();

        let release_date = iso_date(&self.released).or_else(|| {
            not_available(&self.year)
                .and_then(leading_year)
                .map(|year| year.to_string())
        });

        Some(PartialContent {
            original_title: not_available(&self.title).map(str::to_string),
            overview: not_available(&self.plot).map(str::to_string),
            poster_path: not_available(&self.poster).map(str::to_string),
            release_date,
            runtime: leading_number(&self.runtime),
            vote_average: imdb_rating,
            vote_count: parse_count(&self.imdb_votes),
            genres: split_list(&self.genre)
                .map(|genres| genres.iter().map(|g| canonical_genre(g)).collect()),
            original_language: languages.first().cloned(),
            spoken_languages: (!languages.is_empty()).then_some(languages),
            external_id: Some(self.imdb_id.clone()),
            cast: split_list(&self.actors),
            director: not_available(&self.director).map(str::to_string),
            writers: split_list(&self.writer),
            awards_text: not_available(&self.awards).map(str::to_string),
            external_rating: imdb_rating,
            critic_rating,
            ..PartialContent::new(ContentKind::Movie, SourceName::Omdb, id, self.title.clone())
        })
    }
}
