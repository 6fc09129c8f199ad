//! Adapter-boundary cleanup shared by the catalog sources.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("markup regex should compile"));

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
];

/// Removes HTML tags and common entities, collapsing whitespace
pub fn strip_markup(raw: &str) -> String {
    let without_tags = MARKUP_REGEX.replace_all(raw, " ");
    let mut text = without_tags.into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// `None` for blank strings
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `None` for OMDb's "N/A" placeholder and blank values
pub fn not_available(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("N/A") {
        None
    } else {
        Some(trimmed)
    }
}

/// Comma-separated list, ignoring "N/A"
pub fn split_list(raw: &str) -> Option<Vec<String>> {
    not_available(raw).map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Rescales a rating string onto 0-10.
///
/// Accepts "91%", "85/100", "7.5/10" and bare numbers (assumed 0-10).
pub fn normalize_rating(raw: &str) -> Option<f32> {
    let value = not_available(raw)?;

    let scaled = if let Some(percent) = value.strip_suffix('%') {
        percent.trim().parse::<f32>().ok()? / 10.0
    } else if let Some((score, scale)) = value.split_once('/') {
        let score: f32 = score.trim().parse().ok()?;
        let scale: f32 = scale.trim().parse().ok()?;
        if scale <= 0.0 {
            return None;
        }
        score * 10.0 / scale
    } else {
        value.parse::<f32>().ok()?
    };

    Some(scaled.clamp(0.0, 10.0))
}

/// Leading integer in strings like "142 min"
pub fn leading_number(raw: &str) -> Option<u32> {
    let digits: String = not_available(raw)?
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok().filter(|n| *n > 0)
}

/// "1,234,567" -> 1234567
pub fn parse_count(raw: &str) -> Option<u64> {
    not_available(raw)?.replace(',', "").parse().ok()
}

/// Maps a language display name onto its ISO 639-1 code
pub fn language_code(name: &str) -> Option<&'static str> {
    let code = match name.trim().to_lowercase().as_str() {
        "english" => "en",
        "turkish" => "tr",
        "urdu" => "ur",
        "korean" => "ko",
        "hindi" => "hi",
        "spanish" => "es",
        "german" => "de",
        "italian" => "it",
        "tamil" => "ta",
        "telugu" => "te",
        "malayalam" => "ml",
        "kannada" => "kn",
        "bengali" => "bn",
        "marathi" => "mr",
        "punjabi" => "pa",
        "french" => "fr",
        "japanese" => "ja",
        _ => return None,
    };
    Some(code)
}
