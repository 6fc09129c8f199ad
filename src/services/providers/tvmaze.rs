/// TVmaze API source (tertiary catalog, regional dramas)
///
/// Keyless public API. A regional focus this source covers adds a per-region
/// query table; plain genre keywords run too unless the region was the only
/// reason to ask. Every show found is completed with its top cast.
use futures::future::join_all;
use futures::FutureExt;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{genre::canonical_genre, ContentKind, PartialContent, Region, SourceName},
    services::providers::{
        decode, join_variants, log_upstream_failure,
        normalize::{language_code, non_empty, strip_markup},
        CatalogSource, SourceBatch, SourceId, SourceRequest, Variant,
    },
};

pub const DEFAULT_API_URL: &str = "https://api.tvmaze.com";

const SHOWS_PER_REGIONAL_QUERY: usize = 5;
const SHOWS_PER_GENRE_QUERY: usize = 8;
const CAST_LIMIT: usize = 10;

#[derive(Clone)]
pub struct TvmazeSource {
    http_client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl TvmazeSource {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search phrases that surface a region's dramas
    fn regional_queries(region: &Region) -> Vec<String> {
        let queries: &[&str] = match region {
            Region::Turkish => &["turkish drama", "dizi", "ask"],
            Region::Pakistani => &["pakistani drama", "urdu"],
            Region::Korean => &["korean drama", "kdrama"],
            Region::Indian => &["indian drama", "hindi serial"],
            Region::Global => &[],
            Region::Other(name) => return vec![name.to_lowercase()],
        };
        queries.iter().map(|q| q.to_string()).collect()
    }

    /// Plain keyword used for a genre search
    fn genre_keyword(genre: &str) -> &str {
        match genre {
            "science fiction" => "science-fiction",
            other => other,
        }
    }

    async fn search_shows(&self, query: &str) -> AppResult<Vec<TvmazeShow>> {
        let url = format!("{}/search/shows", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;

        let hits: Vec<TvmazeSearchHit> = decode(SourceName::Tvmaze, response).await?;
        Ok(hits.into_iter().map(|hit| hit.show).collect())
    }

    /// Top cast names; a failed lookup leaves cast unknown
    async fn cast(&self, show_id: u64) -> Option<Vec<String>> {
        let url = format!("{}/shows/{}/cast", self.api_url, show_id);
        let result: AppResult<Vec<TvmazeCastMember>> = async {
            let response = self.http_client.get(&url).send().await?;
            decode(SourceName::Tvmaze, response).await
        }
        .await;

        match result {
            Ok(members) => Some(
                members
                    .into_iter()
                    .take(CAST_LIMIT)
                    .map(|m| m.person.name)
                    .collect(),
            ),
            Err(e) => {
                log_upstream_failure(SourceName::Tvmaze, &format!("cast {}", show_id), &e);
                None
            }
        }
    }

    async fn complete(&self, show: TvmazeShow) -> PartialContent {
        let cast = self.cast(show.id).await;
        let mut record = show.into_record();
        record.cast = cast.filter(|names| !names.is_empty());
        record
    }

    /// Regional query: keep shows sharing at least one requested genre
    async fn search_region(
        &self,
        query: &str,
        request: &SourceRequest,
    ) -> AppResult<Vec<PartialContent>> {
        let shows = self.search_shows(query).await?;
        let records = join_all(
            shows
                .into_iter()
                .take(SHOWS_PER_REGIONAL_QUERY)
                .map(|show| self.complete(show)),
        )
        .await;

        Ok(records
            .into_iter()
            .filter(|record| request.genres.is_empty() || shares_genre(record, request))
            .collect())
    }

    /// Genre query: keep shows premiering inside the era (unknown dates pass)
    async fn search_genre(
        &self,
        keyword: &str,
        request: &SourceRequest,
    ) -> AppResult<Vec<PartialContent>> {
        let shows = self.search_shows(keyword).await?;
        let records = join_all(
            shows
                .into_iter()
                .take(SHOWS_PER_GENRE_QUERY)
                .map(|show| self.complete(show)),
        )
        .await;

        Ok(records
            .into_iter()
            .filter(|record| record.year().map_or(true, |year| request.years.contains(year)))
            .collect())
    }
}

fn shares_genre(record: &PartialContent, request: &SourceRequest) -> bool {
    record.genres.as_ref().is_some_and(|genres| {
        genres
            .iter()
            .any(|g| request.genres.contains(&g.to_lowercase()))
    })
}

#[async_trait::async_trait]
impl CatalogSource for TvmazeSource {
    fn name(&self) -> SourceName {
        SourceName::Tvmaze
    }

    fn supports(&self, kind: ContentKind) -> bool {
        kind == ContentKind::Tv
    }

    fn regions(&self) -> Vec<Region> {
        vec![Region::Turkish, Region::Pakistani, Region::Korean]
    }

    async fn search(&self, request: &SourceRequest) -> SourceBatch {
        if !self.supports(request.kind) {
            return SourceBatch::empty();
        }

        let mut variants: Vec<Variant<'_>> = match &request.region {
            Some(region) => Self::regional_queries(region)
                .into_iter()
                .map(|query| {
                    let call = async move { self.search_region(&query, request).await }.boxed();
                    (format!("region {}", region), call)
                })
                .collect(),
            None => Vec::new(),
        };

        if request.region.is_none() || !request.regional_only {
            variants.extend(request.genres.iter().map(|genre| {
                let keyword = Self::genre_keyword(genre);
                (
                    format!("genre {}", keyword),
                    self.search_genre(keyword, request).boxed(),
                )
            }));
        }

        join_variants(SourceName::Tvmaze, self.timeout, variants).await
    }

    async fn fetch_by_id(
        &self,
        kind: ContentKind,
        id: &SourceId,
    ) -> AppResult<Option<PartialContent>> {
        if !self.supports(kind) {
            return Ok(None);
        }

        let response = match id {
            SourceId::Local(show_id) => {
                let url = format!("{}/shows/{}", self.api_url, show_id);
                self.http_client.get(&url).send().await?
            }
            SourceId::External(imdb_id) => {
                let url = format!("{}/lookup/shows", self.api_url);
                self.http_client
                    .get(&url)
                    .query(&[("imdb", imdb_id.as_str())])
                    .send()
                    .await?
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let show: TvmazeShow = decode(SourceName::Tvmaze, response).await?;
        Ok(Some(self.complete(show).await))
    }
}

// ============================================================================
// TVmaze API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TvmazeSearchHit {
    show: TvmazeShow,
}

#[derive(Debug, Deserialize)]
struct TvmazeRating {
    average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct TvmazeNamed {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct TvmazeExternals {
    imdb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvmazeImage {
    medium: Option<String>,
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvmazeShow {
    id: u64,
    name: String,
    language: Option<String>,
    #[serde(default)]
    genres: Vec<String>,
    status: Option<String>,
    runtime: Option<u32>,
    average_runtime: Option<u32>,
    premiered: Option<String>,
    rating: Option<TvmazeRating>,
    network: Option<TvmazeNamed>,
    web_channel: Option<TvmazeNamed>,
    #[serde(default)]
    externals: TvmazeExternals,
    image: Option<TvmazeImage>,
    summary: Option<String>,
}

impl TvmazeShow {
    fn into_record(self) -> PartialContent {
        let language = non_empty(self.language);
        let runtime = self.runtime.or(self.average_runtime).filter(|r| *r > 0);
        let (poster, backdrop) = match self.image {
            Some(image) => {
                let original = non_empty(image.original);
                (original.clone().or(non_empty(image.medium)), original)
            }
            None => (None, None),
        };

        PartialContent {
            original_title: Some(self.name.clone()),
            overview: self
                .summary
                .map(|s| strip_markup(&s))
                .filter(|s| !s.is_empty()),
            poster_path: poster,
            backdrop_path: backdrop,
            release_date: non_empty(self.premiered),
            vote_average: self.rating.and_then(|r| r.average),
            genres: Some(self.genres.iter().map(|g| canonical_genre(g)).collect()),
            original_language: language
                .as_deref()
                .and_then(language_code)
                .map(str::to_string),
            spoken_languages: language.map(|name| {
                vec![language_code(&name).map(str::to_string).unwrap_or(name)]
            }),
            external_id: non_empty(self.externals.imdb),
            episode_runtimes: runtime.map(|r| vec![r]),
            status: non_empty(self.status),
            network: self
                .network
                .or(self.web_channel)
                .and_then(|n| non_empty(Some(n.name))),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tvmaze, self.id, self.name)
        }
    }
}

#[derive(Debug, Deserialize)]
struct TvmazePerson {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TvmazeCastMember {
    person: TvmazePerson,
}
