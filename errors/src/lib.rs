//! # Suggestion Errors
//!
//! Error taxonomy for the subtask suggestion pipeline.
//!
//! - Uses `thiserror` for structured error definitions
//! - Separates per-call transport failures from terminal classified errors
//! - Exposes a stable kind and a retry hint for callers

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Stable classification of a terminal suggestion failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    Overloaded,
    QuotaExceeded,
    InvalidResponse,
    EmptyResult,
    Network,
    Unknown
}

impl ErrorKind {
    /// Ranks retryable kinds so the most informative one survives exhaustion.
    ///
    /// Higher wins. Fail-fast kinds never compete, they short-circuit.
    pub fn specificity(self) -> u8 {
        match self {
            Self::Overloaded => 6,
            Self::QuotaExceeded => 5,
            Self::InvalidResponse => 4,
            Self::EmptyResult => 3,
            Self::Network => 2,
            Self::Unknown => 1,
            Self::Validation | Self::Configuration => 0
        }
    }
}

/// What the caller should offer the user after a failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RetryHint {
    /// Transient failure, an immediate retry is reasonable.
    Now,
    /// Upstream is saturated or rate limited, back off first.
    Later,
    /// Nothing will change until the input or deployment changes.
    Never
}

/// Terminal error returned by the suggestion orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestionError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream overloaded: {message}")]
    Overloaded { message: String },

    #[error("Upstream quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Invalid upstream response: {message}")]
    InvalidResponse { message: String },

    #[error("No valid suggestions generated")]
    EmptyResult,

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Suggestion generation failed: {message}")]
    Unknown { message: String }
}

impl SuggestionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into()
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into()
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into()
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Overloaded { .. } => ErrorKind::Overloaded,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::Network { .. } => ErrorKind::Network,
            Self::Unknown { .. } => ErrorKind::Unknown
        }
    }

    pub fn retry_hint(&self) -> RetryHint {
        match self.kind() {
            ErrorKind::Overloaded | ErrorKind::QuotaExceeded => RetryHint::Later,
            ErrorKind::Validation | ErrorKind::Configuration => RetryHint::Never,
            ErrorKind::InvalidResponse
            | ErrorKind::EmptyResult
            | ErrorKind::Network
            | ErrorKind::Unknown => RetryHint::Now
        }
    }

    /// Validation and configuration errors bypass the retry loops entirely.
    pub fn is_fail_fast(&self) -> bool {
        self.retry_hint() == RetryHint::Never
    }

    /// Message safe to show an end user. Upstream detail never leaks.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } | Self::Configuration { message } => message.clone(),
            Self::Overloaded { .. } => "AI service currently overloaded, retry shortly".to_string(),
            Self::QuotaExceeded { .. } => "API quota exceeded".to_string(),
            Self::InvalidResponse { .. } => "Invalid response from upstream".to_string(),
            Self::EmptyResult => "No valid suggestions generated".to_string(),
            Self::Network { .. } | Self::Unknown { .. } => {
                "Failed to generate suggestions".to_string()
            }
        }
    }
}

/// Category of a single failed upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Upstream answered 503.
    Overloaded,
    /// Upstream answered 429.
    QuotaExceeded,
    /// The request never produced an HTTP response (connect, timeout, body read).
    Network,
    /// Any other non-success HTTP status.
    Status(u16)
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overloaded => write!(f, "overloaded"),
            Self::QuotaExceeded => write!(f, "quota_exceeded"),
            Self::Network => write!(f, "network"),
            Self::Status(code) => write!(f, "http_{code}")
        }
    }
}

/// Failure of exactly one upstream call. Always eligible for model fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure from model {model}: {message}")]
pub struct TransportFailure {
    pub kind: TransportKind,
    pub model: String,
    pub message: String
}

impl TransportFailure {
    pub fn new(kind: TransportKind, model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
            message: message.into()
        }
    }

    pub fn overloaded(model: impl Into<String>) -> Self {
        let model = model.into();
        let message = format!("model {model} is overloaded");
        Self::new(TransportKind::Overloaded, model, message)
    }

    pub fn network(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TransportKind::Network, model, message)
    }

    pub fn status(model: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        match status {
            503 => Self::new(TransportKind::Overloaded, model, message),
            429 => Self::new(TransportKind::QuotaExceeded, model, message),
            other => Self::new(TransportKind::Status(other), model, message)
        }
    }
}

impl From<TransportFailure> for SuggestionError {
    fn from(failure: TransportFailure) -> Self {
        let message = failure.message;
        match failure.kind {
            TransportKind::Overloaded => Self::Overloaded { message },
            TransportKind::QuotaExceeded => Self::QuotaExceeded { message },
            TransportKind::Network => Self::Network { message },
            TransportKind::Status(_) => Self::Unknown { message }
        }
    }
}
