use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// Upstream answered 429 or reported an exhausted quota
    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    #[error("Upstream call timed out: {0}")]
    Timeout(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that originate from a third-party catalog rather than from us
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::HttpClient(_)
                | AppError::ExternalApi(_)
                | AppError::RateLimited(_)
                | AppError::Timeout(_)
                | AppError::MalformedResponse(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_upstream() {
            tracing::warn!(error = %self, "Upstream failure surfaced to client");
        }

        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::ExternalApi(msg) | AppError::MalformedResponse(msg) => {
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        assert!(AppError::RateLimited("tmdb".to_string()).is_upstream());
        assert!(AppError::Timeout("omdb".to_string()).is_upstream());
        assert!(AppError::MalformedResponse("tvmaze".to_string()).is_upstream());
        assert!(!AppError::InvalidInput("text".to_string()).is_upstream());
        assert!(!AppError::NotFound("42".to_string()).is_upstream());
    }

    #[test]
    fn test_status_mapping() {
        let response = AppError::InvalidInput("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::NotFound("movie 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::RateLimited("watchmode".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
