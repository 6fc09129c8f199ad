//! Field-level reconciliation of two partial records for the same title.
//!
//! Identity always follows the primary record. Descriptive fields take the
//! primary value when present and fall back to the secondary one. Enrichment
//! fields (credits, awards, outside ratings) prefer the secondary record,
//! since secondary catalogs exist to supply exactly those.

use crate::models::{Content, ContentCore, ContentKind, Movie, PartialContent, TvSeries};

/// Language assumed when no catalog reports one
const DEFAULT_LANGUAGE: &str = "en";

/// Tracks whether the secondary record filled in anything
struct Contribution(bool);

impl Contribution {
    /// Primary value if present, else the secondary one
    fn fill<T: Clone>(&mut self, primary: &Option<T>, secondary: &Option<T>) -> Option<T> {
        match (primary, secondary) {
            (Some(value), _) => Some(value.clone()),
            (None, Some(value)) => {
                self.0 = true;
                Some(value.clone())
            }
            (None, None) => None,
        }
    }

    /// Secondary value if present, else the primary one
    fn enrich<T: Clone + PartialEq>(
        &mut self,
        primary: &Option<T>,
        secondary: &Option<T>,
    ) -> Option<T> {
        match (primary, secondary) {
            (_, Some(value)) => {
                if primary.as_ref() != Some(value) {
                    self.0 = true;
                }
                Some(value.clone())
            }
            (Some(value), None) => Some(value.clone()),
            (None, None) => None,
        }
    }
}

/// Merges `secondary` into `primary` without filling defaults.
///
/// Fields neither record supplied stay absent, so the result can absorb
/// further records for the same title. `source` becomes the secondary
/// catalog when it contributed at least one field.
pub fn merge_partial(primary: &PartialContent, secondary: &PartialContent) -> PartialContent {
    let mut contribution = Contribution(false);
    let c = &mut contribution;

    let (runtime, number_of_seasons, number_of_episodes, episode_runtimes, status, network) =
        match primary.kind {
            ContentKind::Movie => (
                c.fill(&primary.runtime, &secondary.runtime),
                None,
                None,
                None,
                None,
                None,
            ),
            ContentKind::Tv => (
                None,
                c.fill(&primary.number_of_seasons, &secondary.number_of_seasons),
                c.fill(&primary.number_of_episodes, &secondary.number_of_episodes),
                c.fill(&primary.episode_runtimes, &secondary.episode_runtimes),
                c.fill(&primary.status, &secondary.status),
                c.fill(&primary.network, &secondary.network),
            ),
        };

    let mut merged = PartialContent {
        original_title: c.fill(&primary.original_title, &secondary.original_title),
        overview: c.fill(&primary.overview, &secondary.overview),
        poster_path: c.fill(&primary.poster_path, &secondary.poster_path),
        backdrop_path: c.fill(&primary.backdrop_path, &secondary.backdrop_path),
        release_date: c.fill(&primary.release_date, &secondary.release_date),
        vote_average: c.fill(&primary.vote_average, &secondary.vote_average),
        vote_count: c.fill(&primary.vote_count, &secondary.vote_count),
        genres: c.fill(&primary.genres, &secondary.genres),
        original_language: c.fill(&primary.original_language, &secondary.original_language),
        spoken_languages: c.fill(&primary.spoken_languages, &secondary.spoken_languages),
        external_id: c.fill(&primary.external_id, &secondary.external_id),
        cast: c.enrich(&primary.cast, &secondary.cast),
        director: c.enrich(&primary.director, &secondary.director),
        writers: c.enrich(&primary.writers, &secondary.writers),
        awards_text: c.enrich(&primary.awards_text, &secondary.awards_text),
        external_rating: c.enrich(&primary.external_rating, &secondary.external_rating),
        critic_rating: c.enrich(&primary.critic_rating, &secondary.critic_rating),
        runtime,
        number_of_seasons,
        number_of_episodes,
        episode_runtimes,
        status,
        network,
        id_source: primary.id_source,
        ..PartialContent::new(primary.kind, primary.source, primary.id, primary.title.clone())
    };

    if contribution.0 {
        merged.source = secondary.source;
    }
    merged
}

/// Merges `secondary` into `primary` and completes the result.
///
/// Pure: identical inputs always give an identical record. The provenance tag
/// names the secondary catalog when it contributed at least one field, and
/// the primary catalog otherwise.
pub fn merge(primary: &PartialContent, secondary: &PartialContent) -> Content {
    complete(merge_partial(primary, secondary))
}

/// Completes a record no other catalog contributed to
pub fn finalize(partial: &PartialContent) -> Content {
    complete(partial.clone())
}

/// Fills deterministic defaults for whatever is still absent
fn complete(partial: PartialContent) -> Content {
    let core = ContentCore {
        id: partial.id,
        id_source: partial.id_source,
        title: partial.title,
        original_title: partial.original_title,
        overview: partial.overview.unwrap_or_default(),
        poster_path: partial.poster_path,
        backdrop_path: partial.backdrop_path,
        vote_average: partial.vote_average.unwrap_or_default(),
        vote_count: partial.vote_count.unwrap_or_default(),
        genres: partial.genres.unwrap_or_default(),
        original_language: partial
            .original_language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        spoken_languages: partial.spoken_languages,
        external_id: partial.external_id,
        source_name: partial.source,
        cast: partial.cast,
        director: partial.director,
        writers: partial.writers,
        awards_text: partial.awards_text,
        external_rating: partial.external_rating,
        critic_rating: partial.critic_rating,
    };

    let date = partial.release_date.unwrap_or_default();
    match partial.kind {
        ContentKind::Movie => Content::Movie(Movie {
            core,
            release_date: date,
            runtime: partial.runtime,
        }),
        ContentKind::Tv => Content::Tv(TvSeries {
            core,
            first_air_date: date,
            number_of_seasons: partial.number_of_seasons,
            number_of_episodes: partial.number_of_episodes,
            episode_runtimes: partial.episode_runtimes,
            status: partial.status,
            network: partial.network,
        }),
    }
}

impl From<PartialContent> for Content {
    fn from(partial: PartialContent) -> Self {
        complete(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceName;

    fn tmdb_godfather() -> PartialContent {
        PartialContent {
            original_title: Some("The Godfather".to_string()),
            overview: Some("Spanning the years 1945 to 1955...".to_string()),
            poster_path: Some("https://image.tmdb.org/t/p/w500/godfather.jpg".to_string()),
            release_date: Some("1972-03-14".to_string()),
            runtime: Some(175),
            vote_average: Some(8.7),
            vote_count: Some(20_000),
            genres: Some(vec!["Drama".to_string(), "Crime".to_string()]),
            original_language: Some("en".to_string()),
            external_id: Some("tt0068646".to_string()),
            ..PartialContent::new(ContentKind::Movie, SourceName::Tmdb, 238, "The Godfather")
        }
    }

    fn omdb_godfather() -> PartialContent {
        PartialContent {
            overview: Some("The aging patriarch...".to_string()),
            backdrop_path: None,
            release_date: Some("1972-03-24".to_string()),
            runtime: Some(177),
            vote_average: Some(9.2),
            external_id: Some("tt0068646".to_string()),
            cast: Some(vec!["Marlon Brando".to_string(), "Al Pacino".to_string()]),
            director: Some("Francis Ford Coppola".to_string()),
            awards_text: Some("Won 3 Oscars".to_string()),
            external_rating: Some(9.2),
            critic_rating: Some(9.7),
            ..PartialContent::new(ContentKind::Movie, SourceName::Omdb, 68646, "The Godfather")
        }
    }

    fn tvmaze_series() -> PartialContent {
        PartialContent {
            overview: Some("Forbidden love in Istanbul.".to_string()),
            release_date: Some("2008-09-04".to_string()),
            external_id: Some("tt1352426".to_string()),
            cast: Some(vec!["Beren Saat".to_string()]),
            network: Some("Kanal D".to_string()),
            episode_runtimes: Some(vec![90]),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tvmaze, 7, "Aşk-ı Memnu")
        }
    }

    #[test]
    fn test_identity_comes_from_primary() {
        let merged = merge(&tmdb_godfather(), &omdb_godfather());
        assert_eq!(merged.id(), 238);
        assert_eq!(merged.core().id_source, SourceName::Tmdb);
        assert_eq!(merged.kind(), ContentKind::Movie);
    }

    #[test]
    fn test_present_primary_fields_win() {
        let primary = tmdb_godfather();
        let merged = merge(&primary, &omdb_godfather());

        assert_eq!(merged.core().overview, "Spanning the years 1945 to 1955...");
        assert_eq!(merged.date(), "1972-03-14");
        assert_eq!(merged.runtime(), Some(175));
        assert_eq!(merged.vote_average(), 8.7);
        assert_eq!(merged.core().vote_count, 20_000);
    }

    #[test]
    fn test_absent_primary_fields_are_filled() {
        let mut primary = tmdb_godfather();
        primary.overview = None;
        primary.runtime = None;

        let merged = merge(&primary, &omdb_godfather());
        assert_eq!(merged.core().overview, "The aging patriarch...");
        assert_eq!(merged.runtime(), Some(177));
    }

    #[test]
    fn test_explicit_empty_is_not_absent() {
        let mut primary = tmdb_godfather();
        primary.overview = Some(String::new());

        let merged = merge(&primary, &omdb_godfather());
        assert_eq!(merged.core().overview, "");
    }

    #[test]
    fn test_enrichment_prefers_secondary() {
        let mut primary = tmdb_godfather();
        primary.cast = Some(vec!["Brando".to_string()]);
        primary.writers = Some(vec!["Mario Puzo".to_string()]);

        let merged = merge(&primary, &omdb_godfather());
        let core = merged.core();

        assert_eq!(
            core.cast,
            Some(vec!["Marlon Brando".to_string(), "Al Pacino".to_string()])
        );
        assert_eq!(core.writers, Some(vec!["Mario Puzo".to_string()]));
        assert_eq!(core.director.as_deref(), Some("Francis Ford Coppola"));
        assert_eq!(core.critic_rating, Some(9.7));
    }

    #[test]
    fn test_provenance_names_contributing_source() {
        let merged = merge(&tmdb_godfather(), &omdb_godfather());
        assert_eq!(merged.core().source_name, SourceName::Omdb);

        let bare_secondary = PartialContent {
            overview: Some("ignored".to_string()),
            ..PartialContent::new(ContentKind::Movie, SourceName::Omdb, 1, "ignored")
        };
        let merged = merge(&tmdb_godfather(), &bare_secondary);
        assert_eq!(merged.core().source_name, SourceName::Tmdb);
    }

    #[test]
    fn test_defaults_when_nobody_knows() {
        let bare = PartialContent::new(ContentKind::Movie, SourceName::Tmdb, 1, "Untitled");
        let content = finalize(&bare);
        let core = content.core();

        assert_eq!(core.overview, "");
        assert_eq!(core.vote_average, 0.0);
        assert_eq!(core.vote_count, 0);
        assert!(core.genres.is_empty());
        assert_eq!(core.original_language, "en");
        assert_eq!(core.source_name, SourceName::Tmdb);
        assert_eq!(content.date(), "");
    }

    #[test]
    fn test_series_merge() {
        let tmdb = PartialContent {
            overview: Some("A young woman marries an older man.".to_string()),
            vote_average: Some(7.6),
            number_of_seasons: Some(2),
            external_id: Some("tt1352426".to_string()),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tmdb, 1399, "Aşk-ı Memnu")
        };

        let merged = merge(&tmdb, &tvmaze_series());
        let Content::Tv(series) = &merged else {
            panic!("expected a series");
        };

        assert_eq!(series.core.overview, "A young woman marries an older man.");
        assert_eq!(series.first_air_date, "2008-09-04");
        assert_eq!(series.network.as_deref(), Some("Kanal D"));
        assert_eq!(series.number_of_seasons, Some(2));
        assert_eq!(series.core.cast, Some(vec!["Beren Saat".to_string()]));
        assert_eq!(series.core.source_name, SourceName::Tvmaze);
        assert_eq!(merged.runtime(), Some(90));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let pairs = [
            (tmdb_godfather(), omdb_godfather()),
            (omdb_godfather(), tmdb_godfather()),
            (
                PartialContent::new(ContentKind::Movie, SourceName::Tmdb, 5, "Sparse"),
                omdb_godfather(),
            ),
            (
                PartialContent::new(ContentKind::Tv, SourceName::Tmdb, 1399, "Aşk-ı Memnu"),
                tvmaze_series(),
            ),
            (tvmaze_series(), tvmaze_series()),
        ];

        for (a, b) in pairs {
            let once = merge(&a, &b);
            let twice = merge(&a, &PartialContent::from(&once));
            assert_eq!(once, twice, "merge not idempotent for {}", a.title);
        }
    }

    #[test]
    fn test_partial_merge_keeps_unknown_fields_absent() {
        let primary = PartialContent {
            external_id: Some("tt1352426".to_string()),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tmdb, 1399, "Aşk-ı Memnu")
        };
        let sparse = PartialContent {
            external_id: Some("tt1352426".to_string()),
            ..PartialContent::new(ContentKind::Tv, SourceName::Tvmaze, 7, "Aşk-ı Memnu")
        };
        let detailed = PartialContent {
            overview: Some("real summary".to_string()),
            original_language: Some("tr".to_string()),
            ..sparse.clone()
        };

        let first = merge_partial(&primary, &sparse);
        assert_eq!(first.overview, None);
        assert_eq!(first.original_language, None);
        assert_eq!(first.source, SourceName::Tmdb);

        let content = finalize(&merge_partial(&first, &detailed));
        assert_eq!(content.core().overview, "real summary");
        assert_eq!(content.core().original_language, "tr");
        assert_eq!(content.core().source_name, SourceName::Tvmaze);
        assert_eq!(content.id(), 1399);
    }

    #[test]
    fn test_partial_merge_drops_fields_of_other_kind() {
        let movie = PartialContent {
            network: Some("HBO".to_string()),
            ..PartialContent::new(ContentKind::Movie, SourceName::Tmdb, 1, "Film")
        };
        let merged = merge_partial(&movie, &tvmaze_series());
        assert_eq!(merged.network, None);
        assert_eq!(merged.kind, ContentKind::Movie);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let a = tmdb_godfather();
        let b = omdb_godfather();
        assert_eq!(merge(&a, &b), merge(&a, &b));
    }
}
