use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::genre::genre_key;
use crate::models::{ContentKind, Mood, MoodInterpretation};

/// Era searched when neither the request nor the interpretation names one
pub const DEFAULT_ERA: YearRange = YearRange { from: 1970, to: 2005 };
/// Lower bound used by classics-only searches without an explicit start year
pub const CLASSICS_FLOOR: i32 = 1900;
/// Classics-only searches never reach past this year
pub const CLASSICS_CEILING: i32 = 1990;

/// Inclusive release-year window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.from && year <= self.to
    }
}

/// Runtime window in minutes; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl RuntimeBounds {
    /// Unknown runtimes are never excluded
    pub fn admits(&self, runtime: Option<u32>) -> bool {
        let Some(minutes) = runtime else {
            return true;
        };
        self.min.map_or(true, |min| minutes >= min) && self.max.map_or(true, |max| minutes <= max)
    }
}

/// Regional focus tag attached to a search
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    Global,
    Turkish,
    Pakistani,
    Korean,
    Indian,
    Other(String),
}

impl Region {
    pub fn as_str(&self) -> &str {
        match self {
            Region::Global => "Global",
            Region::Turkish => "Turkish",
            Region::Pakistani => "Pakistani",
            Region::Korean => "Korean",
            Region::Indian => "Indian",
            Region::Other(name) => name,
        }
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "global" => Region::Global,
            "turkish" => Region::Turkish,
            "pakistani" => Region::Pakistani,
            "korean" => Region::Korean,
            "indian" => Region::Indian,
            _ => Region::Other(value.trim().to_string()),
        }
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Region::from(value.to_string())
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, source-agnostic search query.
///
/// Immutable once built; construct through [`SearchOptions::builder`].
/// Genres and languages are sets, so the serialized form does not depend on
/// the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchOptions {
    genres: BTreeSet<String>,
    languages: BTreeSet<String>,
    years: YearRange,
    runtime: RuntimeBounds,
    region: Option<Region>,
    classics_only: bool,
}

impl SearchOptions {
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }

    /// Lowercase canonical genre names
    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    /// ISO 639-1 codes; empty means "use the default priority list"
    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    pub fn runtime(&self) -> RuntimeBounds {
        self.runtime
    }

    /// Regional focus, with "Global" treated as no focus
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref().filter(|r| **r != Region::Global)
    }

    pub fn classics_only(&self) -> bool {
        self.classics_only
    }

    /// Canonical cache key for these options combined with a kind filter
    pub fn cache_key(&self, kind: Option<ContentKind>) -> String {
        serde_json::to_string(&(self, kind)).unwrap_or_else(|_| format!("{:?}|{:?}", self, kind))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptionsBuilder {
    genres: BTreeSet<String>,
    languages: BTreeSet<String>,
    year_from: Option<i32>,
    year_to: Option<i32>,
    runtime: RuntimeBounds,
    region: Option<Region>,
    classics_only: bool,
}

impl SearchOptionsBuilder {
    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.genres.extend(
            genres
                .into_iter()
                .map(|g| genre_key(g.as_ref()))
                .filter(|g| !g.is_empty()),
        );
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages.extend(
            languages
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .filter(|l| !l.is_empty()),
        );
        self
    }

    pub fn year_from(mut self, year: Option<i32>) -> Self {
        self.year_from = year;
        self
    }

    pub fn year_to(mut self, year: Option<i32>) -> Self {
        self.year_to = year;
        self
    }

    pub fn min_runtime(mut self, minutes: Option<u32>) -> Self {
        self.runtime.min = minutes;
        self
    }

    pub fn max_runtime(mut self, minutes: Option<u32>) -> Self {
        self.runtime.max = minutes;
        self
    }

    pub fn region(mut self, region: Option<Region>) -> Self {
        self.region = region;
        self
    }

    pub fn classics_only(mut self, classics_only: bool) -> Self {
        self.classics_only = classics_only;
        self
    }

    /// Fills in the era defaults. Classics-only searches start at 1900 unless
    /// told otherwise and are capped at 1990.
    pub fn build(self) -> SearchOptions {
        let years = if self.classics_only {
            YearRange {
                from: self.year_from.unwrap_or(CLASSICS_FLOOR),
                to: self.year_to.unwrap_or(CLASSICS_CEILING).min(CLASSICS_CEILING),
            }
        } else {
            YearRange {
                from: self.year_from.unwrap_or(DEFAULT_ERA.from),
                to: self.year_to.unwrap_or(DEFAULT_ERA.to),
            }
        };

        SearchOptions {
            genres: self.genres,
            languages: self.languages,
            years,
            runtime: self.runtime,
            region: self.region,
            classics_only: self.classics_only,
        }
    }
}

/// Search body accepted by the HTTP layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub mood: Option<Mood>,
    pub text: Option<String>,
    pub genres: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub max_runtime: Option<u32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub content_type: Option<ContentKind>,
    pub regional_focus: Option<String>,
    #[serde(default)]
    pub old_classics_only: bool,
}

impl SearchRequest {
    /// Free text worth sending to the mood interpreter
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Turns the request into search options.
    ///
    /// Genres come from the explicit list, then the interpretation, then the
    /// selected mood, and finally fall back to drama. Year bounds prefer the
    /// request over the interpreted era.
    pub fn resolve(&self, interpretation: Option<&MoodInterpretation>) -> AppResult<SearchOptions> {
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(AppError::InvalidInput(format!(
                    "yearFrom ({}) is after yearTo ({})",
                    from, to
                )));
            }
        }

        let genres: Vec<String> = match (&self.genres, interpretation, self.mood) {
            (Some(genres), _, _) if !genres.is_empty() => genres.clone(),
            (_, Some(interp), _) if !interp.preferred_genres.is_empty() => {
                interp.preferred_genres.clone()
            }
            (_, _, Some(mood)) => mood.genres().iter().map(|g| g.to_string()).collect(),
            _ => vec!["drama".to_string()],
        };

        let era = interpretation.and_then(|i| i.era);

        let mut languages = self.languages.clone().unwrap_or_default();
        if languages.is_empty() {
            if let Some(preferred) = interpretation.and_then(|i| i.language_preference.clone()) {
                languages.push(preferred);
            }
        }

        Ok(SearchOptions::builder()
            .genres(genres)
            .languages(languages)
            .year_from(self.year_from.or(era.map(|e| e.from)))
            .year_to(self.year_to.or(era.map(|e| e.to)))
            .max_runtime(self.max_runtime.or(interpretation.and_then(|i| i.max_runtime_min)))
            .min_runtime(interpretation.and_then(|i| i.min_runtime_min))
            .region(self.regional_focus.as_deref().map(Region::from))
            .classics_only(self.old_classics_only)
            .build())
    }
}
