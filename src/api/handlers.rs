use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Content, ContentKind, Feedback, MoodInterpretation, NewFeedback, SearchRequest,
        SourceName, StreamingSource,
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct InterpretMoodRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub movies: Vec<Content>,
    pub tv_series: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<MoodInterpretation>,
    pub total: usize,
}

/// Which catalog numbered the id in the path; TMDb when omitted
#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub source: Option<SourceName>,
}

impl TitleQuery {
    fn source(&self) -> SourceName {
        self.source.unwrap_or(SourceName::Tmdb)
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub sources: Vec<StreamingSource>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedResponse {
    pub content_ids: Vec<u64>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn interpret_mood(
    State(state): State<AppState>,
    Json(request): Json<InterpretMoodRequest>,
) -> AppResult<Json<MoodInterpretation>> {
    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Text is required".to_string()))?;

    Ok(Json(state.interpreter.interpret(text).await))
}

/// Interprets free text if given, then runs the cached multi-catalog search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let interpretation = match request.text() {
        Some(text) => Some(state.interpreter.interpret(text).await),
        None => None,
    };

    let options = request.resolve(interpretation.as_ref())?;
    let results = state
        .catalog
        .search_content(&options, request.content_type)
        .await;

    let (movies, tv_series): (Vec<Content>, Vec<Content>) = results
        .iter()
        .cloned()
        .partition(|content| content.kind() == ContentKind::Movie);

    tracing::info!(
        movies = movies.len(),
        tv_series = tv_series.len(),
        interpreted = interpretation.is_some(),
        "Search served"
    );

    Ok(Json(SearchResponse {
        total: results.len(),
        movies,
        tv_series,
        interpretation,
    }))
}

async fn details(
    state: &AppState,
    kind: ContentKind,
    id: u64,
    query: &TitleQuery,
) -> AppResult<Json<Content>> {
    state
        .catalog
        .details(kind, query.source(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {} from {}", kind, id, query.source())))
}

pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<Content>> {
    details(&state, ContentKind::Movie, id, &query).await
}

pub async fn tv_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<Content>> {
    details(&state, ContentKind::Tv, id, &query).await
}

pub async fn movie_availability(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let sources = state
        .catalog
        .availability(ContentKind::Movie, query.source(), id)
        .await?;
    Ok(Json(AvailabilityResponse { sources }))
}

pub async fn tv_availability(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let sources = state
        .catalog
        .availability(ContentKind::Tv, query.source(), id)
        .await?;
    Ok(Json(AvailabilityResponse { sources }))
}

pub async fn create_feedback(
    State(state): State<AppState>,
    Json(request): Json<NewFeedback>,
) -> (StatusCode, Json<Feedback>) {
    let feedback = state.feedback.record(request).await;
    (StatusCode::CREATED, Json(feedback))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if state.feedback.remove(id).await {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::NotFound(format!("Feedback {}", id)))
    }
}

pub async fn liked_content(State(state): State<AppState>) -> Json<LikedResponse> {
    Json(LikedResponse {
        content_ids: state.feedback.liked_content_ids().await,
    })
}

pub async fn content_feedback(
    State(state): State<AppState>,
    Path(content_id): Path<u64>,
) -> Json<Vec<Feedback>> {
    Json(state.feedback.for_content(content_id).await)
}
