use std::sync::Arc;

use crate::{
    db::{CacheKey, SearchCache, TitleCache},
    error::AppResult,
    models::{Content, ContentKind, SearchOptions, SourceName, StreamingSource},
    services::{availability::AvailabilityProvider, search::ContentSearch},
};

/// Cached front door to search, title details and availability
#[derive(Clone)]
pub struct CatalogService {
    search: ContentSearch,
    search_cache: SearchCache,
    titles: TitleCache,
    availability: Arc<dyn AvailabilityProvider>,
}

impl CatalogService {
    pub fn new(
        search: ContentSearch,
        search_cache: SearchCache,
        titles: TitleCache,
        availability: Arc<dyn AvailabilityProvider>,
    ) -> Self {
        Self {
            search,
            search_cache,
            titles,
            availability,
        }
    }

    /// Ranked results for `options`, served from the search cache while fresh.
    ///
    /// Every freshly searched title also lands in the title cache.
    pub async fn search_content(
        &self,
        options: &SearchOptions,
        kind: Option<ContentKind>,
    ) -> Arc<Vec<Content>> {
        let key = CacheKey::Search(options.cache_key(kind));

        self.search_cache
            .get_or_compute(&key, async {
                let results = self.search.search_content(options, kind).await;
                self.titles.store_all(&results).await;
                results
            })
            .await
    }

    pub async fn details(
        &self,
        kind: ContentKind,
        source: SourceName,
        id: u64,
    ) -> AppResult<Option<Content>> {
        let details = self
            .search
            .get_enriched_details(kind, source, id, None)
            .await?;

        if let Some(content) = &details {
            self.titles.store(content.clone()).await;
        }
        Ok(details)
    }

    /// Streaming sources for a title.
    ///
    /// Known sources come from the title cache. Otherwise the title's
    /// external id is resolved and the provider asked; an unknown title or
    /// one without an external id yields an empty list.
    pub async fn availability(
        &self,
        kind: ContentKind,
        source: SourceName,
        id: u64,
    ) -> AppResult<Vec<StreamingSource>> {
        let key = CacheKey::Title(kind, source, id);

        let cached = self.titles.get(&key).await;
        if let Some(sources) = cached.as_ref().and_then(|c| c.streaming_sources.clone()) {
            tracing::debug!(cache_key = %key, sources = sources.len(), "Availability cache hit");
            return Ok(sources);
        }

        let content = match cached {
            Some(cached) if cached.content.external_id().is_some() => Some(cached.content),
            _ => self.search.get_enriched_details(kind, source, id, None).await?,
        };

        let Some(content) = content else {
            return Ok(Vec::new());
        };
        let Some(external_id) = content.external_id().map(str::to_string) else {
            tracing::debug!(cache_key = %key, "No external id, availability unknown");
            return Ok(Vec::new());
        };

        let sources = self.availability.availability(&external_id).await;
        tracing::info!(
            provider = self.availability.name(),
            cache_key = %key,
            sources = sources.len(),
            "Availability resolved"
        );

        self.titles
            .store_with_sources(content, sources.clone())
            .await;
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::cache::SEARCH_TTL;
    use crate::models::PartialContent;
    use crate::services::availability::MockAvailabilityProvider;
    use crate::services::providers::{CatalogSource, MockCatalogSource, SourceBatch};
    use crate::services::search::SearchPolicy;
    use mockall::predicate::eq;

    fn record(id: u64, external_id: Option<&str>) -> PartialContent {
        PartialContent {
            vote_average: Some(8.0),
            external_id: external_id.map(str::to_string),
            ..PartialContent::new(ContentKind::Movie, SourceName::Tmdb, id, format!("Movie {}", id))
        }
    }

    fn tmdb() -> MockCatalogSource {
        let mut source = MockCatalogSource::new();
        source.expect_name().return_const(SourceName::Tmdb);
        source.expect_supports().return_const(true);
        source.expect_regions().returning(Vec::new);
        source
    }

    fn netflix() -> StreamingSource {
        StreamingSource {
            name: "Netflix".to_string(),
            source_type: "sub".to_string(),
            web_url: None,
            ios_url: None,
            android_url: None,
        }
    }

    fn catalog(primary: MockCatalogSource, provider: MockAvailabilityProvider) -> CatalogService {
        CatalogService::new(
            ContentSearch::new(
                Arc::new(primary) as Arc<dyn CatalogSource>,
                Vec::new(),
                SearchPolicy::default(),
            ),
            SearchCache::new(SEARCH_TTL, 100),
            TitleCache::new(SEARCH_TTL, 100),
            Arc::new(provider),
        )
    }

    fn options() -> SearchOptions {
        SearchOptions::builder().genres(["drama"]).languages(["en"]).build()
    }

    #[tokio::test]
    async fn test_repeat_search_hits_cache() {
        let mut primary = tmdb();
        primary.expect_search().times(1).returning(|_| SourceBatch {
            records: vec![record(1, Some("tt0000001"))],
            calls: 1,
            failures: 0,
        });

        let catalog = catalog(primary, MockAvailabilityProvider::new());

        let first = catalog.search_content(&options(), Some(ContentKind::Movie)).await;
        let second = catalog.search_content(&options(), Some(ContentKind::Movie)).await;

        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_availability_uses_searched_title() {
        let mut primary = tmdb();
        primary.expect_search().returning(|_| SourceBatch {
            records: vec![record(1, Some("tt0000001"))],
            calls: 1,
            failures: 0,
        });
        primary.expect_fetch_by_id().never();

        let mut provider = MockAvailabilityProvider::new();
        provider.expect_name().return_const("watchmode");
        provider
            .expect_availability()
            .with(eq("tt0000001"))
            .times(1)
            .returning(|_| vec![netflix()]);

        let catalog = catalog(primary, provider);
        catalog.search_content(&options(), Some(ContentKind::Movie)).await;

        let sources = catalog
            .availability(ContentKind::Movie, SourceName::Tmdb, 1)
            .await
            .unwrap();
        assert_eq!(sources, vec![netflix()]);

        // second lookup is served from the title cache
        let again = catalog
            .availability(ContentKind::Movie, SourceName::Tmdb, 1)
            .await
            .unwrap();
        assert_eq!(again, vec![netflix()]);
    }

    #[tokio::test]
    async fn test_availability_resolves_details_for_unseen_title() {
        let mut primary = tmdb();
        primary
            .expect_fetch_by_id()
            .times(1)
            .returning(|_, _| Ok(Some(record(9, Some("tt0000009")))));

        let mut provider = MockAvailabilityProvider::new();
        provider.expect_name().return_const("watchmode");
        provider
            .expect_availability()
            .with(eq("tt0000009"))
            .returning(|_| vec![netflix()]);

        let sources = catalog(primary, provider)
            .availability(ContentKind::Movie, SourceName::Tmdb, 9)
            .await
            .unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[tokio::test]
    async fn test_availability_without_external_id_is_empty() {
        let mut primary = tmdb();
        primary
            .expect_fetch_by_id()
            .returning(|_, _| Ok(Some(record(4, None))));

        let mut provider = MockAvailabilityProvider::new();
        provider.expect_availability().never();

        let sources = catalog(primary, provider)
            .availability(ContentKind::Movie, SourceName::Tmdb, 4)
            .await
            .unwrap();
        assert!(sources.is_empty());
    }

    #[tokio::test]
    async fn test_details_of_unknown_title() {
        let mut primary = tmdb();
        primary.expect_fetch_by_id().returning(|_, _| Ok(None));

        let details = catalog(primary, MockAvailabilityProvider::new())
            .details(ContentKind::Movie, SourceName::Tmdb, 404)
            .await
            .unwrap();
        assert!(details.is_none());
    }
}
