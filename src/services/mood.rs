/// Free-text mood interpretation
///
/// The language model is tried first. Any failure (transport, quota, empty or
/// malformed output, out-of-range values) falls back to a deterministic
/// keyword classifier, so `interpret` always produces an answer.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{Era, Mood, MoodInterpretation},
    services::providers::decode,
};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const SHORT_RUNTIME_MAX: u32 = 120;
const MATCHED_CONFIDENCE: f32 = 0.7;
const UNMATCHED_CONFIDENCE: f32 = 0.5;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MoodInterpreter: Send + Sync {
    async fn interpret(&self, text: &str) -> MoodInterpretation;
}

/// Picks the mood with the most keyword hits in `text`.
///
/// Ties go to the mood listed first. No hits means relaxed with a lower
/// confidence. The era is always the default one.
pub fn classify_by_keywords(text: &str) -> MoodInterpretation {
    let lowered = text.to_lowercase();

    let mut detected = Mood::default();
    let mut best = 0;
    for mood in Mood::ALL {
        let hits = mood
            .keywords()
            .iter()
            .filter(|word| lowered.contains(*word))
            .count();
        if hits > best {
            best = hits;
            detected = mood;
        }
    }

    let max_runtime_min = (lowered.contains("short") || lowered.contains("quick"))
        .then_some(SHORT_RUNTIME_MAX);

    MoodInterpretation {
        mood: detected,
        preferred_genres: detected.genres().iter().map(|g| g.to_string()).collect(),
        max_runtime_min,
        min_runtime_min: None,
        era: Some(Era::default()),
        language_preference: None,
        confidence: if best > 0 {
            MATCHED_CONFIDENCE
        } else {
            UNMATCHED_CONFIDENCE
        },
    }
}

/// Keyword classifier on its own, used when no model key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

#[async_trait::async_trait]
impl MoodInterpreter for KeywordInterpreter {
    async fn interpret(&self, text: &str) -> MoodInterpretation {
        classify_by_keywords(text)
    }
}

#[derive(Clone)]
pub struct GeminiInterpreter {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

// Gemini API Types

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Model output before validation; numbers arrive as JSON floats
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInterpretation {
    mood: String,
    preferred_genres: Vec<String>,
    max_runtime_min: Option<f64>,
    min_runtime_min: Option<f64>,
    era: Option<RawEra>,
    language_preference: Option<String>,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawEra {
    from: f64,
    to: f64,
}

impl RawInterpretation {
    fn validate(self) -> AppResult<MoodInterpretation> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AppError::MalformedResponse(format!(
                "confidence {} outside 0..1",
                self.confidence
            )));
        }

        let era = match self.era {
            Some(RawEra { from, to }) if from > to => {
                return Err(AppError::MalformedResponse(format!(
                    "era {}-{} is inverted",
                    from, to
                )))
            }
            Some(RawEra { from, to }) => Some(Era {
                from: from.round() as i32,
                to: to.round() as i32,
            }),
            None => None,
        };

        let mood = Mood::parse(&self.mood).unwrap_or_else(|| {
            tracing::debug!(mood = %self.mood, "Model returned unknown mood, using relaxed");
            Mood::Relaxed
        });

        Ok(MoodInterpretation {
            mood,
            preferred_genres: self
                .preferred_genres
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
            max_runtime_min: minutes(self.max_runtime_min)?,
            min_runtime_min: minutes(self.min_runtime_min)?,
            era,
            language_preference: self
                .language_preference
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            confidence: self.confidence as f32,
        })
    }
}

fn minutes(raw: Option<f64>) -> AppResult<Option<u32>> {
    match raw {
        Some(value) if !value.is_finite() || value < 0.0 => Err(AppError::MalformedResponse(
            format!("runtime {} is not a minute count", value),
        )),
        Some(value) => Ok(Some(value.round() as u32)),
        None => Ok(None),
    }
}

fn system_prompt() -> String {
    let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
    format!(
        "You are a mood analysis expert for classic movie recommendations.\n\
         Analyze the user's text and extract:\n\
         1. The primary mood from: {}\n\
         2. Preferred movie genres\n\
         3. Runtime preferences (min/max in minutes)\n\
         4. Era preferences (year range, default to 1970-2005 for classics)\n\
         5. Language preference (if mentioned)\n\
         6. Confidence score (0-1)",
        moods.join(", ")
    )
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mood": {"type": "STRING"},
            "preferredGenres": {"type": "ARRAY", "items": {"type": "STRING"}},
            "maxRuntimeMin": {"type": "NUMBER"},
            "minRuntimeMin": {"type": "NUMBER"},
            "era": {
                "type": "OBJECT",
                "properties": {
                    "from": {"type": "NUMBER"},
                    "to": {"type": "NUMBER"}
                }
            },
            "languagePreference": {"type": "STRING"},
            "confidence": {"type": "NUMBER"}
        },
        "required": ["mood", "preferredGenres", "confidence"]
    })
}

impl GeminiInterpreter {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            model,
        }
    }

    async fn ask_model(&self, text: &str) -> AppResult<MoodInterpretation> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let body = json!({
            "systemInstruction": {"parts": [{"text": system_prompt()}]},
            "contents": [{"role": "user", "parts": [{"text": text}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let generated: GenerateResponse = decode("Gemini", response).await?;

        let raw_json = generated
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MalformedResponse("Empty response from Gemini".to_string()))?;

        let raw: RawInterpretation = serde_json::from_str(&raw_json).map_err(|e| {
            AppError::MalformedResponse(format!("Gemini output is not an interpretation: {}", e))
        })?;

        raw.validate()
    }
}

#[async_trait::async_trait]
impl MoodInterpreter for GeminiInterpreter {
    async fn interpret(&self, text: &str) -> MoodInterpretation {
        match self.ask_model(text).await {
            Ok(interpretation) => {
                tracing::info!(
                    provider = "gemini",
                    mood = %interpretation.mood,
                    confidence = interpretation.confidence,
                    "Mood interpreted"
                );
                interpretation
            }
            Err(e) => {
                tracing::warn!(provider = "gemini", error = %e, "Mood interpretation failed, using keyword fallback");
                classify_by_keywords(text)
            }
        }
    }
}
