//! Error types for the suggestion server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response}
};
use errors::{ErrorKind, RetryHint, SuggestionError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for the server.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur while serving suggestion requests.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Terminal failure of a suggestion orchestration.
    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    /// Request body could not be read as a suggestion request.
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Server startup error.
    #[error("Server error: {0}")]
    Server(String)
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub retry: RetryHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

impl ServerError {
    /// HTTP status, user-facing message, stable code, retry hint, details.
    fn parts(&self) -> (StatusCode, String, String, RetryHint, Option<String>) {
        match self {
            Self::Suggestion(err) => {
                let status = match err.kind() {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
                    ErrorKind::Configuration
                    | ErrorKind::InvalidResponse
                    | ErrorKind::EmptyResult
                    | ErrorKind::Network
                    | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    err.user_message(),
                    err.kind().to_string(),
                    err.retry_hint(),
                    None
                )
            }
            Self::InvalidBody { message } => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                "invalid_body".to_string(),
                RetryHint::Never,
                Some(message.clone())
            ),
            Self::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "configuration".to_string(),
                RetryHint::Never,
                None
            ),
            Self::Server(msg) => {
                tracing::error!(message = %msg, "Server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    "server_error".to_string(),
                    RetryHint::Now,
                    None
                )
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error, code, retry, details) = self.parts();

        let body = ErrorResponse {
            error,
            code,
            retry,
            details
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_error(err: SuggestionError) -> (StatusCode, String) {
        let (status, error, ..) = ServerError::from(err).parts();
        (status, error)
    }

    #[test]
    fn test_suggestion_error_mapping() {
        assert_eq!(
            status_and_error(SuggestionError::validation("Task title is required")),
            (StatusCode::BAD_REQUEST, "Task title is required".to_string())
        );
        assert_eq!(
            status_and_error(SuggestionError::configuration("Gemini API key not configured")),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gemini API key not configured".to_string()
            )
        );
        assert_eq!(
            status_and_error(SuggestionError::Overloaded {
                message: "busy".to_string()
            }),
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI service currently overloaded, retry shortly".to_string()
            )
        );
        assert_eq!(
            status_and_error(SuggestionError::QuotaExceeded {
                message: "limit".to_string()
            }),
            (StatusCode::TOO_MANY_REQUESTS, "API quota exceeded".to_string())
        );
        assert_eq!(
            status_and_error(SuggestionError::invalid_response("no candidates")),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid response from upstream".to_string()
            )
        );
        assert_eq!(
            status_and_error(SuggestionError::EmptyResult),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No valid suggestions generated".to_string()
            )
        );
        assert_eq!(
            status_and_error(SuggestionError::Network {
                message: "reset".to_string()
            }),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate suggestions".to_string()
            )
        );
    }

    #[test]
    fn test_upstream_detail_is_not_exposed() {
        let (_, error, code, retry, details) = ServerError::from(SuggestionError::Unknown {
            message: "upstream returned 500 with secret body".to_string()
        })
        .parts();
        assert_eq!(error, "Failed to generate suggestions");
        assert_eq!(code, "unknown");
        assert_eq!(retry, RetryHint::Now);
        assert!(details.is_none());
    }

    #[test]
    fn test_error_response_serialization() {
        let resp = ErrorResponse {
            error: "API quota exceeded".to_string(),
            code: "quota_exceeded".to_string(),
            retry: RetryHint::Later,
            details: None
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["retry"], "later");
        assert_eq!(json["code"], "quota_exceeded");
        assert!(json.get("details").is_none());
    }
}
