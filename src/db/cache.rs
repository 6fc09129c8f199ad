use chrono::Utc;
use moka::future::Cache;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{CachedTitle, Content, ContentKind, SourceName, StreamingSource};

/// Default lifetime of a cached search
pub const SEARCH_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Canonical serialization of search options plus kind filter
    Search(String),
    Title(ContentKind, SourceName, u64),
}

impl CacheKey {
    pub fn title(content: &Content) -> Self {
        CacheKey::Title(content.kind(), content.core().id_source, content.id())
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search(options) => write!(f, "search:{}", options),
            CacheKey::Title(kind, source, id) => write!(f, "title:{}:{}:{}", kind, source, id),
        }
    }
}

/// Search results keyed by canonical options, expired purely by age
#[derive(Clone)]
pub struct SearchCache {
    entries: Cache<String, Arc<Vec<Content>>>,
}

impl SearchCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the cached list for `key`, or runs `compute` and stores its
    /// result as one unit.
    ///
    /// Concurrent callers with the same key share a single computation.
    pub async fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> Arc<Vec<Content>>
    where
        F: Future<Output = Vec<Content>>,
    {
        let key = key.to_string();
        if let Some(hit) = self.entries.get(&key).await {
            tracing::debug!(cache_key = %key, results = hit.len(), "Search cache hit");
            return hit;
        }

        self.entries
            .get_with(key, async move {
                let results = compute.await;
                tracing::debug!(results = results.len(), "Search cache populated");
                Arc::new(results)
            })
            .await
    }
}

/// Per-title detail cache, filled by searches and availability lookups
#[derive(Clone)]
pub struct TitleCache {
    entries: Cache<String, CachedTitle>,
}

impl TitleCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CachedTitle> {
        self.entries.get(&key.to_string()).await
    }

    /// Caches `content`, keeping any streaming sources already known for it
    pub async fn store(&self, content: Content) {
        let key = CacheKey::title(&content);
        let streaming_sources = self
            .get(&key)
            .await
            .and_then(|cached| cached.streaming_sources);

        self.entries
            .insert(
                key.to_string(),
                CachedTitle {
                    content,
                    streaming_sources,
                    cached_at: Utc::now(),
                },
            )
            .await;
    }

    pub async fn store_all(&self, contents: &[Content]) {
        for content in contents {
            self.store(content.clone()).await;
        }
    }

    /// Caches `content` together with where it can be streamed
    pub async fn store_with_sources(&self, content: Content, sources: Vec<StreamingSource>) {
        let key = CacheKey::title(&content);
        self.entries
            .insert(
                key.to_string(),
                CachedTitle {
                    content,
                    streaming_sources: Some(sources),
                    cached_at: Utc::now(),
                },
            )
            .await;
    }
}
