/// Multi-source search orchestrator
///
/// Queries the primary catalog for every requested kind, decides per
/// fallback catalog whether it is worth calling, folds fallback records into
/// the primary ones by external id, then ranks and truncates.
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Content, ContentKind, PartialContent, SearchOptions, SourceName},
    services::{
        merge::{finalize, merge_partial},
        providers::{log_upstream_failure, CatalogSource, SourceId, SourceRequest},
    },
};

/// Knobs for when fallback catalogs are consulted and how much is returned
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    /// Languages tried when the request names none, in priority order
    pub default_languages: Vec<String>,
    /// Fewer primary results than this triggers every fallback
    pub thin_results_threshold: usize,
    /// An upper year bound before this triggers every fallback
    pub classics_year_cutoff: i32,
    pub max_results: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            default_languages: ["hi", "en", "es", "it", "de"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            thin_results_threshold: 5,
            classics_year_cutoff: 2000,
            max_results: 20,
        }
    }
}

/// Why a fallback catalog was consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Classics,
    ThinResults,
    Region,
}

#[derive(Clone)]
pub struct ContentSearch {
    primary: Arc<dyn CatalogSource>,
    fallbacks: Vec<Arc<dyn CatalogSource>>,
    policy: SearchPolicy,
}

/// Records gathered for one kind, in first-seen order
struct Accumulator {
    records: Vec<PartialContent>,
    seen: HashSet<(SourceName, u64)>,
    by_external_id: HashMap<String, usize>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            by_external_id: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    /// Adds a primary record unless its id was already seen
    fn push(&mut self, record: PartialContent) {
        if !self.seen.insert((record.id_source, record.id)) {
            return;
        }
        if let Some(external_id) = record.external_id.clone() {
            self.by_external_id
                .entry(external_id)
                .or_insert(self.records.len());
        }
        self.records.push(record);
    }

    /// Merges into the record sharing the external id, or appends
    fn fold(&mut self, record: PartialContent) {
        let existing = record
            .external_id
            .as_ref()
            .and_then(|id| self.by_external_id.get(id).copied());

        match existing {
            Some(index) => {
                self.records[index] = merge_partial(&self.records[index], &record);
            }
            None => self.push(record),
        }
    }
}

impl ContentSearch {
    pub fn new(
        primary: Arc<dyn CatalogSource>,
        fallbacks: Vec<Arc<dyn CatalogSource>>,
        policy: SearchPolicy,
    ) -> Self {
        Self {
            primary,
            fallbacks,
            policy,
        }
    }

    fn request(&self, options: &SearchOptions, kind: ContentKind) -> SourceRequest {
        let languages = if options.languages().is_empty() {
            self.policy.default_languages.clone()
        } else {
            options.languages().iter().cloned().collect()
        };

        SourceRequest {
            kind,
            genres: options.genres().clone(),
            languages,
            years: options.years(),
            region: None,
            regional_only: false,
        }
    }

    /// Whether a fallback catalog should be consulted, and why
    fn trigger(
        &self,
        source: &dyn CatalogSource,
        options: &SearchOptions,
        primary_count: usize,
    ) -> Option<Trigger> {
        if options.classics_only() || options.years().to < self.policy.classics_year_cutoff {
            return Some(Trigger::Classics);
        }
        if primary_count < self.policy.thin_results_threshold {
            return Some(Trigger::ThinResults);
        }
        let region = options.region()?;
        source
            .regions()
            .contains(region)
            .then_some(Trigger::Region)
    }

    /// Searches one kind across every applicable catalog, then filters,
    /// ranks and truncates that kind's list
    async fn search_kind(&self, options: &SearchOptions, kind: ContentKind) -> Vec<Content> {
        let base = self.request(options, kind);
        let mut accumulated = Accumulator::new();

        let primary_batch = self.primary.search(&base).await;
        let mut calls = primary_batch.calls;
        let mut failures = primary_batch.failures;
        if primary_batch.all_failed() {
            tracing::warn!(
                provider = %self.primary.name(),
                kind = %kind,
                "Primary catalog failed for every language"
            );
        }
        for record in primary_batch.records {
            accumulated.push(record);
        }

        let primary_count = accumulated.len();
        let planned: Vec<(Arc<dyn CatalogSource>, SourceRequest)> = self
            .fallbacks
            .iter()
            .filter(|source| source.supports(kind))
            .filter_map(|source| {
                let trigger = self.trigger(source.as_ref(), options, primary_count)?;
                let region = options
                    .region()
                    .filter(|region| source.regions().contains(region))
                    .cloned();
                tracing::debug!(
                    provider = %source.name(),
                    kind = %kind,
                    trigger = ?trigger,
                    "Consulting fallback catalog"
                );
                Some((
                    Arc::clone(source),
                    SourceRequest {
                        region,
                        regional_only: trigger == Trigger::Region,
                        ..base.clone()
                    },
                ))
            })
            .collect();

        let batches = join_all(
            planned
                .iter()
                .map(|(source, request)| source.search(request)),
        )
        .await;

        for batch in batches {
            calls += batch.calls;
            failures += batch.failures;
            for record in batch.records {
                accumulated.fold(record);
            }
        }

        if calls > 0 && failures == calls {
            tracing::error!(kind = %kind, calls, "Every catalog call failed");
        }

        tracing::info!(
            kind = %kind,
            primary_results = primary_count,
            fallbacks = planned.len(),
            results = accumulated.len(),
            "Kind search completed"
        );

        let mut seen = HashSet::new();
        let mut results: Vec<Content> = accumulated
            .records
            .iter()
            .map(finalize)
            .filter(|content| options.runtime().admits(content.runtime()))
            .filter(|content| seen.insert((content.core().id_source, content.id())))
            .collect();

        // Stable: equal ratings keep first-seen order
        results.sort_by(|a, b| b.vote_average().total_cmp(&a.vote_average()));
        results.truncate(self.policy.max_results);
        results
    }

    /// Searches the requested kind, or both kinds concurrently.
    ///
    /// Each kind is ranked and truncated on its own, so a full page of
    /// movies never crowds out series. Never fails: upstream failures shrink
    /// the result, at worst to empty.
    pub async fn search_content(
        &self,
        options: &SearchOptions,
        kind: Option<ContentKind>,
    ) -> Vec<Content> {
        let kinds: Vec<ContentKind> = match kind {
            Some(kind) => vec![kind],
            None => ContentKind::ALL.to_vec(),
        };

        join_all(kinds.iter().map(|kind| self.search_kind(options, *kind)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// One title from `source`, completed from every other catalog that
    /// knows its external id.
    ///
    /// `Ok(None)` when `source` does not know the title.
    pub async fn get_enriched_details(
        &self,
        kind: ContentKind,
        source: SourceName,
        id: u64,
        external_id: Option<&str>,
    ) -> AppResult<Option<Content>> {
        let catalogs: Vec<&Arc<dyn CatalogSource>> = std::iter::once(&self.primary)
            .chain(self.fallbacks.iter())
            .filter(|catalog| catalog.supports(kind))
            .collect();

        let Some(origin) = catalogs.iter().find(|catalog| catalog.name() == source) else {
            return Ok(None);
        };

        let Some(base) = origin.fetch_by_id(kind, &SourceId::Local(id)).await? else {
            return Ok(None);
        };

        let Some(external_id) = external_id
            .map(str::to_string)
            .or_else(|| base.external_id.clone())
        else {
            return Ok(Some(finalize(&base)));
        };

        let lookups = join_all(
            catalogs
                .iter()
                .filter(|catalog| catalog.name() != source)
                .map(|catalog| {
                    let external = SourceId::External(external_id.clone());
                    async move { (catalog.name(), catalog.fetch_by_id(kind, &external).await) }
                }),
        )
        .await;

        let mut record = base;
        for (name, lookup) in lookups {
            match lookup {
                Ok(Some(other)) => record = merge_partial(&record, &other),
                Ok(None) => {}
                Err(e) => log_upstream_failure(name, &format!("details {}", external_id), &e),
            }
        }

        Ok(Some(finalize(&record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Region;
    use crate::services::providers::{MockCatalogSource, SourceBatch};
    use mockall::predicate::eq;

    fn movie(source: SourceName, id: u64, vote: f32, external_id: Option<&str>) -> PartialContent {
        PartialContent {
            vote_average: Some(vote),
            external_id: external_id.map(str::to_string),
            ..PartialContent::new(ContentKind::Movie, source, id, format!("{} {}", source, id))
        }
    }

    fn series(source: SourceName, id: u64, vote: f32, external_id: Option<&str>) -> PartialContent {
        PartialContent {
            kind: ContentKind::Tv,
            ..movie(source, id, vote, external_id)
        }
    }

    fn batch(records: Vec<PartialContent>, calls: usize, failures: usize) -> SourceBatch {
        SourceBatch {
            records,
            calls,
            failures,
        }
    }

    fn primary_returning(records: Vec<PartialContent>) -> MockCatalogSource {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary.expect_regions().returning(Vec::new);
        primary
            .expect_search()
            .returning(move |request| {
                let kind = request.kind;
                let records = records.iter().filter(|r| r.kind == kind).cloned().collect();
                batch(records, request.languages.len(), 0)
            });
        primary
    }

    fn fallback(name: SourceName, kind: ContentKind, regions: Vec<Region>) -> MockCatalogSource {
        let mut source = MockCatalogSource::new();
        source.expect_name().return_const(name);
        source
            .expect_supports()
            .returning(move |requested| requested == kind);
        source.expect_regions().returning(move || regions.clone());
        source
    }

    fn drama_options() -> SearchOptions {
        SearchOptions::builder()
            .genres(["Drama"])
            .languages(["hi", "en"])
            .year_from(Some(1970))
            .year_to(Some(2005))
            .build()
    }

    fn search(primary: MockCatalogSource, fallbacks: Vec<MockCatalogSource>) -> ContentSearch {
        ContentSearch::new(
            Arc::new(primary),
            fallbacks
                .into_iter()
                .map(|f| Arc::new(f) as Arc<dyn CatalogSource>)
                .collect(),
            SearchPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_enough_primary_results_skip_secondary() {
        let primary = primary_returning(vec![
            movie(SourceName::Tmdb, 1, 7.1, None),
            movie(SourceName::Tmdb, 2, 8.4, None),
            movie(SourceName::Tmdb, 3, 7.9, None),
            movie(SourceName::Tmdb, 4, 8.8, None),
            movie(SourceName::Tmdb, 5, 7.5, None),
        ]);

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search().never();

        let results = search(primary, vec![omdb])
            .search_content(&drama_options(), Some(ContentKind::Movie))
            .await;

        let votes: Vec<f32> = results.iter().map(|c| c.vote_average()).collect();
        assert_eq!(votes, vec![8.8, 8.4, 7.9, 7.5, 7.1]);
    }

    #[tokio::test]
    async fn test_classics_only_always_consults_secondary() {
        let primary = primary_returning(
            (1..=6)
                .map(|id| movie(SourceName::Tmdb, id, 7.0 + id as f32 / 10.0, None))
                .collect(),
        );

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search()
            .times(1)
            .withf(|request| request.years.to == 1990 && request.region.is_none())
            .returning(|_| batch(vec![movie(SourceName::Omdb, 68646, 9.2, Some("tt0068646"))], 1, 0));

        let options = SearchOptions::builder()
            .genres(["Drama"])
            .languages(["hi", "en"])
            .year_from(Some(1970))
            .year_to(Some(1990))
            .classics_only(true)
            .build();

        let results = search(primary, vec![omdb])
            .search_content(&options, Some(ContentKind::Movie))
            .await;

        assert_eq!(results.len(), 7);
        assert_eq!(results[0].core().id_source, SourceName::Omdb);
    }

    #[tokio::test]
    async fn test_secondary_fills_missing_director_by_external_id() {
        let primary = primary_returning(vec![movie(SourceName::Tmdb, 238, 8.7, Some("tt0068646"))]);

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search().times(1).returning(|_| {
            let record = PartialContent {
                director: Some("Francis Ford Coppola".to_string()),
                ..movie(SourceName::Omdb, 68646, 9.2, Some("tt0068646"))
            };
            batch(vec![record], 1, 0)
        });

        let results = search(primary, vec![omdb])
            .search_content(&drama_options(), Some(ContentKind::Movie))
            .await;

        assert_eq!(results.len(), 1);
        let core = results[0].core();
        assert_eq!(core.id, 238);
        assert_eq!(core.external_id.as_deref(), Some("tt0068646"));
        assert_eq!(core.director.as_deref(), Some("Francis Ford Coppola"));
        assert_eq!(core.vote_average, 8.7);
        assert_eq!(core.source_name, SourceName::Omdb);
    }

    #[tokio::test]
    async fn test_shared_numeric_id_without_external_id_stays_distinct() {
        let primary = primary_returning(vec![movie(SourceName::Tmdb, 42, 7.4, None)]);

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search()
            .returning(|_| batch(vec![movie(SourceName::Omdb, 42, 8.0, None)], 1, 0));

        let results = search(primary, vec![omdb])
            .search_content(&drama_options(), Some(ContentKind::Movie))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].core().id_source, SourceName::Omdb);
        assert_eq!(results[1].core().id_source, SourceName::Tmdb);
    }

    #[tokio::test]
    async fn test_primary_failure_degrades_to_fallback_results() {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary.expect_regions().returning(Vec::new);
        primary
            .expect_search()
            .returning(|request| batch(Vec::new(), request.languages.len(), request.languages.len()));

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search()
            .returning(|_| batch(vec![movie(SourceName::Omdb, 33, 8.1, Some("tt0033467"))], 1, 0));

        let mut tvmaze = fallback(SourceName::Tvmaze, ContentKind::Tv, Vec::new());
        tvmaze
            .expect_search()
            .returning(|_| batch(vec![series(SourceName::Tvmaze, 7, 7.9, None)], 1, 0));

        let results = search(primary, vec![omdb, tvmaze])
            .search_content(&drama_options(), None)
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind(), ContentKind::Movie);
        assert_eq!(results[1].kind(), ContentKind::Tv);
    }

    #[tokio::test]
    async fn test_everything_failing_returns_empty() {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary.expect_search().returning(|_| batch(Vec::new(), 2, 2));

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_search().returning(|_| batch(Vec::new(), 3, 3));

        let results = search(primary, vec![omdb])
            .search_content(&drama_options(), Some(ContentKind::Movie))
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_regional_focus_routes_to_matching_catalog() {
        let primary = primary_returning(
            (1..=6)
                .map(|id| series(SourceName::Tmdb, id, 8.0, None))
                .collect(),
        );

        let mut tvmaze = fallback(
            SourceName::Tvmaze,
            ContentKind::Tv,
            vec![Region::Turkish, Region::Pakistani, Region::Korean],
        );
        tvmaze
            .expect_search()
            .times(1)
            .withf(|request| request.region == Some(Region::Turkish) && request.regional_only)
            .returning(|_| batch(vec![series(SourceName::Tvmaze, 7, 8.5, Some("tt1352426"))], 3, 0));

        let options = SearchOptions::builder()
            .genres(["Drama"])
            .region(Some(Region::from("Turkish")))
            .build();

        let results = search(primary, vec![tvmaze])
            .search_content(&options, Some(ContentKind::Tv))
            .await;

        assert_eq!(results.len(), 7);
        assert_eq!(results[0].core().id_source, SourceName::Tvmaze);
    }

    #[tokio::test]
    async fn test_thin_primary_keeps_genre_search_alongside_region() {
        let primary = primary_returning(Vec::new());

        let mut tvmaze = fallback(
            SourceName::Tvmaze,
            ContentKind::Tv,
            vec![Region::Turkish, Region::Pakistani, Region::Korean],
        );
        tvmaze
            .expect_search()
            .times(1)
            .withf(|request| request.region == Some(Region::Turkish) && !request.regional_only)
            .returning(|_| batch(vec![series(SourceName::Tvmaze, 7, 8.5, None)], 5, 0));

        let options = SearchOptions::builder()
            .genres(["Drama"])
            .region(Some(Region::Turkish))
            .build();

        let results = search(primary, vec![tvmaze])
            .search_content(&options, Some(ContentKind::Tv))
            .await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_both_kinds_are_truncated_separately() {
        let mut records: Vec<PartialContent> = (1..=25)
            .map(|id| movie(SourceName::Tmdb, id, 9.0, None))
            .collect();
        records.extend((101..=111).map(|id| series(SourceName::Tmdb, id, 7.5, None)));

        let results = search(primary_returning(records), Vec::new())
            .search_content(&drama_options(), None)
            .await;

        let movies = results.iter().filter(|c| c.kind() == ContentKind::Movie).count();
        let shows = results.iter().filter(|c| c.kind() == ContentKind::Tv).count();
        assert_eq!(movies, 20);
        assert_eq!(shows, 11);
    }

    #[tokio::test]
    async fn test_fallback_records_sharing_external_id_fill_remaining_gaps() {
        let primary = primary_returning(vec![series(SourceName::Tmdb, 1, 8.0, Some("tt1"))]);

        let mut tvmaze = fallback(SourceName::Tvmaze, ContentKind::Tv, Vec::new());
        tvmaze.expect_search().returning(|_| {
            let sparse = series(SourceName::Tvmaze, 70, 7.0, Some("tt1"));
            let detailed = PartialContent {
                overview: Some("real summary".to_string()),
                original_language: Some("tr".to_string()),
                ..series(SourceName::Tvmaze, 71, 7.0, Some("tt1"))
            };
            batch(vec![sparse, detailed], 2, 0)
        });

        let results = search(primary, vec![tvmaze])
            .search_content(&drama_options(), Some(ContentKind::Tv))
            .await;

        assert_eq!(results.len(), 1);
        let core = results[0].core();
        assert_eq!(core.id, 1);
        assert_eq!(core.overview, "real summary");
        assert_eq!(core.original_language, "tr");
        assert_eq!(core.source_name, SourceName::Tvmaze);
    }

    #[tokio::test]
    async fn test_unsupported_region_skips_regional_catalog() {
        let primary = primary_returning(
            (1..=6)
                .map(|id| series(SourceName::Tmdb, id, 8.0, None))
                .collect(),
        );

        let mut tvmaze = fallback(
            SourceName::Tvmaze,
            ContentKind::Tv,
            vec![Region::Turkish, Region::Pakistani, Region::Korean],
        );
        tvmaze.expect_search().never();

        let options = SearchOptions::builder()
            .genres(["Drama"])
            .region(Some(Region::Indian))
            .build();

        let results = search(primary, vec![tvmaze])
            .search_content(&options, Some(ContentKind::Tv))
            .await;
        assert_eq!(results.len(), 6);
    }

    #[tokio::test]
    async fn test_equal_ratings_keep_first_seen_order() {
        let primary = primary_returning(vec![
            movie(SourceName::Tmdb, 10, 7.5, None),
            movie(SourceName::Tmdb, 11, 8.0, None),
            movie(SourceName::Tmdb, 12, 7.5, None),
            movie(SourceName::Tmdb, 13, 8.0, None),
            movie(SourceName::Tmdb, 14, 7.5, None),
            movie(SourceName::Tmdb, 10, 9.9, None),
        ]);

        let results = search(primary, Vec::new())
            .search_content(&drama_options(), Some(ContentKind::Movie))
            .await;

        let ids: Vec<u64> = results.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![11, 13, 10, 12, 14]);
    }

    #[tokio::test]
    async fn test_runtime_bounds_and_truncation() {
        let mut records: Vec<PartialContent> = (1..=30)
            .map(|id| PartialContent {
                runtime: Some(90),
                ..movie(SourceName::Tmdb, id, 6.0 + id as f32 / 10.0, None)
            })
            .collect();
        records.push(PartialContent {
            runtime: Some(200),
            ..movie(SourceName::Tmdb, 99, 9.9, None)
        });
        records.push(movie(SourceName::Tmdb, 100, 9.8, None));

        let options = SearchOptions::builder()
            .genres(["Drama"])
            .max_runtime(Some(120))
            .build();

        let results = search(primary_returning(records), Vec::new())
            .search_content(&options, Some(ContentKind::Movie))
            .await;

        assert_eq!(results.len(), 20);
        assert_eq!(results[0].id(), 100);
        assert!(results.iter().all(|c| c.id() != 99));
    }

    #[tokio::test]
    async fn test_enriched_details_merge_secondary_by_external_id() {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary
            .expect_fetch_by_id()
            .with(eq(ContentKind::Movie), eq(SourceId::Local(238)))
            .returning(|_, _| Ok(Some(movie(SourceName::Tmdb, 238, 8.7, Some("tt0068646")))));

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_fetch_by_id()
            .with(eq(ContentKind::Movie), eq(SourceId::External("tt0068646".to_string())))
            .returning(|_, _| {
                Ok(Some(PartialContent {
                    awards_text: Some("Won 3 Oscars".to_string()),
                    ..movie(SourceName::Omdb, 68646, 9.2, Some("tt0068646"))
                }))
            });

        let mut tvmaze = fallback(SourceName::Tvmaze, ContentKind::Tv, Vec::new());
        tvmaze.expect_fetch_by_id().never();

        let details = search(primary, vec![omdb, tvmaze])
            .get_enriched_details(ContentKind::Movie, SourceName::Tmdb, 238, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(details.id(), 238);
        assert_eq!(details.core().awards_text.as_deref(), Some("Won 3 Oscars"));
        assert_eq!(details.vote_average(), 8.7);
    }

    #[tokio::test]
    async fn test_enriched_details_tolerate_secondary_failure() {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary
            .expect_fetch_by_id()
            .returning(|_, _| Ok(Some(movie(SourceName::Tmdb, 238, 8.7, None))));

        let mut omdb = fallback(SourceName::Omdb, ContentKind::Movie, Vec::new());
        omdb.expect_fetch_by_id()
            .returning(|_, _| Err(AppError::RateLimited("Request limit reached!".to_string())));

        let details = search(primary, vec![omdb])
            .get_enriched_details(ContentKind::Movie, SourceName::Tmdb, 238, Some("tt0068646"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(details.core().source_name, SourceName::Tmdb);
    }

    #[tokio::test]
    async fn test_enriched_details_unknown_title() {
        let mut primary = MockCatalogSource::new();
        primary.expect_name().return_const(SourceName::Tmdb);
        primary.expect_supports().return_const(true);
        primary.expect_fetch_by_id().returning(|_, _| Ok(None));

        let details = search(primary, Vec::new())
            .get_enriched_details(ContentKind::Tv, SourceName::Tmdb, 1, None)
            .await
            .unwrap();
        assert!(details.is_none());
    }
}
