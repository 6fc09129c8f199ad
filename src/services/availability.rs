/// Streaming availability lookup
///
/// API Flow (Watchmode):
/// 1. /v1/search/?search_field=imdb_id converts an IMDb id to a Watchmode id
/// 2. /v1/title/{watchmode_id}/sources/ lists where the title streams
///
/// Lookups never fail toward the caller. An empty list means "unknown", not
/// "confirmed unavailable".
use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{StreamingSource, WatchmodeSearchResponse, WatchmodeSource},
    services::providers::decode,
};

pub const DEFAULT_API_URL: &str = "https://api.watchmode.com";

const PROVIDER_LABEL: &str = "Watchmode";
const REGION: &str = "US";
const MAX_SOURCES: usize = 5;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Where the title with this IMDb id can be watched
    async fn availability(&self, external_id: &str) -> Vec<StreamingSource>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct WatchmodeProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl WatchmodeProvider {
    pub fn new(http_client: HttpClient, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url,
        }
    }

    /// Lookup Watchmode ID by IMDB ID
    async fn get_watchmode_id(&self, api_key: &str, imdb_id: &str) -> AppResult<Option<u64>> {
        let url = format!("{}/v1/search/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("search_field", "imdb_id"),
                ("search_value", imdb_id),
            ])
            .send()
            .await?;

        let search_response: WatchmodeSearchResponse = decode(PROVIDER_LABEL, response).await?;

        Ok(search_response.title_results.first().map(|r| r.id))
    }

    async fn fetch_sources(&self, api_key: &str, watchmode_id: u64) -> AppResult<Vec<StreamingSource>> {
        let url = format!("{}/v1/title/{}/sources/", self.api_url, watchmode_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("apiKey", api_key)])
            .send()
            .await?;

        let sources: Vec<WatchmodeSource> = decode(PROVIDER_LABEL, response).await?;

        Ok(sources
            .into_iter()
            .filter(|source| source.region.as_deref() == Some(REGION))
            .take(MAX_SOURCES)
            .map(StreamingSource::from)
            .collect())
    }

    async fn lookup(&self, api_key: &str, imdb_id: &str) -> AppResult<Vec<StreamingSource>> {
        match self.get_watchmode_id(api_key, imdb_id).await? {
            Some(watchmode_id) => self.fetch_sources(api_key, watchmode_id).await,
            None => {
                tracing::debug!(imdb_id = %imdb_id, provider = "watchmode", "No Watchmode ID found");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait::async_trait]
impl AvailabilityProvider for WatchmodeProvider {
    async fn availability(&self, external_id: &str) -> Vec<StreamingSource> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };
        if external_id.trim().is_empty() {
            return Vec::new();
        }

        match self.lookup(api_key, external_id).await {
            Ok(sources) => {
                tracing::info!(
                    imdb_id = %external_id,
                    sources = sources.len(),
                    provider = "watchmode",
                    "Availability fetched"
                );
                sources
            }
            Err(e @ AppError::RateLimited(_)) => {
                tracing::warn!(imdb_id = %external_id, error = %e, provider = "watchmode", "Availability quota exhausted");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(imdb_id = %external_id, error = %e, provider = "watchmode", "Availability fetch failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "watchmode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> WatchmodeProvider {
        WatchmodeProvider::new(
            HttpClient::new(),
            Some("test_key".to_string()),
            server.uri(),
        )
    }

    async fn mount_search(server: &MockServer, imdb_id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/search/"))
            .and(query_param("search_field", "imdb_id"))
            .and(query_param("search_value", imdb_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn source(id: u64, name: &str, region: &str) -> serde_json::Value {
        json!({
            "source_id": id,
            "name": name,
            "type": "sub",
            "region": region,
            "web_url": format!("https://watch.test/{}", id),
            "format": "HD"
        })
    }

    #[tokio::test]
    async fn test_availability_keeps_us_sources_only() {
        let server = MockServer::start().await;
        mount_search(&server, "tt0111161", json!({"title_results": [{"id": 1340}]})).await;

        let mut sources = vec![source(1, "Foreign", "GB")];
        for id in 2..9 {
            sources.push(source(id, &format!("Service {}", id), "US"));
        }

        Mock::given(method("GET"))
            .and(path("/v1/title/1340/sources/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(sources)))
            .mount(&server)
            .await;

        let result = provider(&server).availability("tt0111161").await;

        assert_eq!(result.len(), 5);
        assert_eq!(result[0].name, "Service 2");
        assert!(result.iter().all(|s| s.name != "Foreign"));
    }

    #[tokio::test]
    async fn test_availability_without_key_is_empty() {
        let server = MockServer::start().await;
        let provider = WatchmodeProvider::new(HttpClient::new(), Some(String::new()), server.uri());

        assert!(provider.availability("tt0111161").await.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_availability_unknown_title_is_empty() {
        let server = MockServer::start().await;
        mount_search(&server, "tt9999999", json!({"title_results": []})).await;

        assert!(provider(&server).availability("tt9999999").await.is_empty());
    }

    #[tokio::test]
    async fn test_availability_quota_exhausted_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search/"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert!(provider(&server).availability("tt0111161").await.is_empty());
    }

    #[tokio::test]
    async fn test_get_watchmode_id_surfaces_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search/"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = provider(&server).get_watchmode_id("test_key", "tt0111161").await;
        assert!(matches!(result, Err(AppError::RateLimited(_))));
    }
}
