/// Catalog source abstraction
///
/// Each upstream catalog (TMDb, OMDb, TVmaze) implements [`CatalogSource`] and
/// returns partial records. Adapters never fail a whole search: a failed
/// language or keyword variant is logged and contributes nothing.
use futures::future::{join_all, BoxFuture};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{ContentKind, PartialContent, Region, SourceName, YearRange},
};

pub mod normalize;
pub mod omdb;
pub mod tmdb;
pub mod tvmaze;

pub use omdb::OmdbSource;
pub use tmdb::TmdbSource;
pub use tvmaze::TvmazeSource;

/// What the orchestrator asks one catalog for
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRequest {
    pub kind: ContentKind,
    /// Lowercase canonical genre names
    pub genres: BTreeSet<String>,
    /// Language codes to query. The configured default list keeps its
    /// priority order; languages named by the caller arrive sorted.
    pub languages: Vec<String>,
    pub years: YearRange,
    /// Only set when the source supports the requested region
    pub region: Option<Region>,
    /// Skip the plain genre search when a region is set. Only true when the
    /// region alone caused this source to be consulted.
    pub regional_only: bool,
}

/// Records from one adapter search plus per-variant call accounting
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub records: Vec<PartialContent>,
    pub calls: usize,
    pub failures: usize,
}

impl SourceBatch {
    pub fn empty() -> Self {
        Self::default()
    }

    /// At least one call was made and every one of them failed
    pub fn all_failed(&self) -> bool {
        self.calls > 0 && self.failures == self.calls
    }
}

/// Identifier accepted by [`CatalogSource::fetch_by_id`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// The catalog's own numbering
    Local(u64),
    /// Cross-source IMDb id
    External(String),
}

impl Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceId::Local(id) => write!(f, "{}", id),
            SourceId::External(id) => f.write_str(id),
        }
    }
}

/// Trait for upstream catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Provider name for logging and provenance
    fn name(&self) -> SourceName;

    /// Whether this catalog carries the given kind at all
    fn supports(&self, kind: ContentKind) -> bool;

    /// Regional tags this catalog specializes in
    fn regions(&self) -> Vec<Region> {
        Vec::new()
    }

    /// Discovery search. Never errors; failed variants are counted in the batch.
    async fn search(&self, request: &SourceRequest) -> SourceBatch;

    /// Single-title lookup. `Ok(None)` when the catalog does not know the title.
    async fn fetch_by_id(&self, kind: ContentKind, id: &SourceId)
        -> AppResult<Option<PartialContent>>;
}

/// One labelled upstream call inside an adapter search
pub type Variant<'a> = (String, BoxFuture<'a, AppResult<Vec<PartialContent>>>);

/// Runs every variant concurrently, each bounded by `timeout`.
///
/// A failed or timed-out variant is logged and counted; it never cancels its
/// siblings.
pub async fn join_variants(
    source: SourceName,
    timeout: Duration,
    variants: Vec<Variant<'_>>,
) -> SourceBatch {
    let calls = variants.len();

    let outcomes = join_all(variants.into_iter().map(|(label, call)| async move {
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{} call '{}' exceeded {:?}",
                source, label, timeout
            ))),
        };
        (label, outcome)
    }))
    .await;

    let mut batch = SourceBatch {
        calls,
        ..SourceBatch::empty()
    };

    for (label, outcome) in outcomes {
        match outcome {
            Ok(records) => batch.records.extend(records),
            Err(e) => {
                log_upstream_failure(source, &label, &e);
                batch.failures += 1;
            }
        }
    }

    if batch.failures > 0 {
        tracing::warn!(
            provider = %source,
            success_count = batch.calls - batch.failures,
            error_count = batch.failures,
            "Partial catalog fetch failure"
        );
    }

    tracing::info!(
        provider = %source,
        results = batch.records.len(),
        calls = batch.calls,
        "Catalog search completed"
    );

    batch
}

/// Logs an upstream failure so quota exhaustion and timeouts stand apart
/// from generic errors
pub fn log_upstream_failure(source: SourceName, label: &str, error: &AppError) {
    match error {
        AppError::RateLimited(_) => {
            tracing::warn!(provider = %source, variant = %label, error = %error, "Upstream quota exhausted")
        }
        AppError::Timeout(_) => {
            tracing::warn!(provider = %source, variant = %label, error = %error, "Upstream call timed out")
        }
        AppError::HttpClient(e) if e.is_timeout() => {
            tracing::warn!(provider = %source, variant = %label, error = %error, "Upstream call timed out")
        }
        _ => {
            tracing::error!(provider = %source, variant = %label, error = %error, "Upstream call failed")
        }
    }
}

/// Checks the status and decodes a JSON body.
///
/// 429 becomes [`AppError::RateLimited`], other non-2xx statuses become
/// [`AppError::ExternalApi`] and undecodable bodies become
/// [`AppError::MalformedResponse`].
pub async fn decode<T: DeserializeOwned>(
    source: impl Display,
    response: reqwest::Response,
) -> AppResult<T> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::RateLimited(format!("{} returned {}", source, status)));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalApi(format!(
            "{} API returned status {}: {}",
            source, status, body
        )));
    }

    let response_text = response.text().await?;
    serde_json::from_str(&response_text).map_err(|e| {
        tracing::debug!(provider = %source, response = %response_text, "Raw upstream response");
        AppError::MalformedResponse(format!("Failed to parse {} response: {}", source, e))
    })
}
