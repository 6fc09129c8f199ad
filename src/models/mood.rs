use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::search::DEFAULT_ERA;

/// Moods a user can pick or have inferred from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Nostalgic,
    Adventurous,
    Romantic,
    Intense,
    Relaxed,
    Mysterious,
    Superhero,
}

impl Mood {
    /// Table order; keyword ties resolve to the earlier entry
    pub const ALL: [Mood; 9] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Nostalgic,
        Mood::Adventurous,
        Mood::Romantic,
        Mood::Intense,
        Mood::Relaxed,
        Mood::Mysterious,
        Mood::Superhero,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Nostalgic => "nostalgic",
            Mood::Adventurous => "adventurous",
            Mood::Romantic => "romantic",
            Mood::Intense => "intense",
            Mood::Relaxed => "relaxed",
            Mood::Mysterious => "mysterious",
            Mood::Superhero => "superhero",
        }
    }

    /// Lenient parse used on model output
    pub fn parse(raw: &str) -> Option<Mood> {
        let lowered = raw.trim().to_lowercase();
        Mood::ALL.into_iter().find(|m| m.as_str() == lowered)
    }

    pub fn genres(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["comedy", "family", "music"],
            Mood::Sad => &["drama", "romance"],
            Mood::Nostalgic => &["drama", "family", "romance"],
            Mood::Adventurous => &["adventure", "action", "western"],
            Mood::Romantic => &["romance", "drama"],
            Mood::Intense => &["thriller", "crime", "mystery"],
            Mood::Relaxed => &["comedy", "drama", "family"],
            Mood::Mysterious => &["mystery", "thriller", "crime"],
            Mood::Superhero => &["action", "adventure", "science fiction", "fantasy"],
        }
    }

    /// Words in free text that suggest this mood
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["happy", "cheerful", "uplifting", "joyful", "fun", "comedy", "laugh"],
            Mood::Sad => &["sad", "melancholy", "emotional", "cry", "tears", "depressing"],
            Mood::Nostalgic => &["nostalgic", "classic", "old", "vintage", "memories", "remember"],
            Mood::Adventurous => &["adventure", "exciting", "action", "thrilling", "explore"],
            Mood::Romantic => &["romantic", "love", "romance", "date", "couple"],
            Mood::Intense => &["intense", "thriller", "suspense", "dark", "serious", "crime"],
            Mood::Relaxed => &["relaxed", "calm", "peaceful", "easy", "light", "comfortable"],
            Mood::Mysterious => &["mysterious", "mystery", "detective", "puzzle", "enigma"],
            Mood::Superhero => &[],
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Relaxed
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year window suggested by an interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    pub from: i32,
    pub to: i32,
}

impl Default for Era {
    fn default() -> Self {
        Era {
            from: DEFAULT_ERA.from,
            to: DEFAULT_ERA.to,
        }
    }
}

/// Structured guess about what the user feels like watching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInterpretation {
    pub mood: Mood,
    #[serde(default)]
    pub preferred_genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_runtime_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_runtime_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<Era>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<String>,
    /// 0..=1
    pub confidence: f32,
}
