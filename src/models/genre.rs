//! Controlled genre vocabulary shared by every catalog adapter.

/// Canonical genre names, in display order
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Mystery",
    "Romance",
    "Science Fiction",
    "TV Movie",
    "Thriller",
    "War",
    "Western",
];

/// Spellings used by upstream catalogs that map onto a canonical name
const ALIASES: &[(&str, &str)] = &[
    ("sci-fi", "Science Fiction"),
    ("science-fiction", "Science Fiction"),
    ("scifi", "Science Fiction"),
    ("musical", "Music"),
    ("historical", "History"),
    ("romantic", "Romance"),
    ("suspense", "Thriller"),
    ("anime", "Animation"),
    ("biography", "History"),
];

/// Maps an upstream genre label onto the controlled vocabulary.
///
/// Unrecognized labels pass through unchanged (trimmed).
pub fn canonical_genre(raw: &str) -> String {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();

    if let Some(name) = GENRES.iter().find(|g| g.to_lowercase() == lowered) {
        return (*name).to_string();
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Search-side key for a genre: lowercase canonical name
pub fn genre_key(raw: &str) -> String {
    canonical_genre(raw).to_lowercase()
}
