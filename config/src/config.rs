//! # Configuration Structures
//!
//! This module defines all configuration structures for the suggestion
//! service.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Fall back to the documented defaults for every missing field

use serde::{Deserialize, Serialize};
use task_core::ApiKey;
use validator::Validate;

/// Main configuration structure for the suggestion service.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Provides centralized configuration for the subtask suggestion pipeline:
/// upstream model access, retry policy, generation parameters, the HTTP
/// surface and logging.
///
/// ## Usage
/// ```rust,no_run
/// use config::SuggestConfig;
///
/// let config = SuggestConfig::default();
/// println!("Primary model: {}", config.upstream.models[0]);
/// ```
///
/// ## Fields
/// - `upstream`: Gemini endpoint, credential, fallback models, timeout
/// - `retry`: Outer retry count and exponential backoff base
/// - `generation`: Sampling parameters sent with every request
/// - `server`: Bind address of the HTTP surface
/// - `observability`: Log level and metrics toggle
///
/// ## Validation
/// All nested configurations must pass their own validation rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct SuggestConfig {
    /// Upstream generative-language API configuration
    #[serde(default)]
    #[validate(nested)]
    pub upstream: UpstreamConfig,

    /// Retry and backoff policy
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,

    /// Generation parameters
    #[serde(default)]
    #[validate(nested)]
    pub generation: GenerationConfig,

    /// HTTP server configuration
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Logging and metrics configuration
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// Upstream API configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `api_key`: Gemini API key (optional here; requests fail with a
///   configuration error when absent)
/// - `base_url`: API root (default: "https://generativelanguage.googleapis.com/v1beta")
/// - `models`: Fallback list, tried in order (default: flash then pro)
/// - `timeout_seconds`: Per-call timeout (default: 30)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct UpstreamConfig {
    #[serde(
        default,
        deserialize_with = "ApiKey::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<ApiKey>,

    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default = "default_models")]
    #[validate(length(min = 1, max = 8), custom(function = "validate_models"))]
    pub models: Vec<String>,

    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_models() -> Vec<String> {
    vec!["gemini-1.5-flash".to_string(), "gemini-1.5-pro".to_string()]
}

fn default_timeout_seconds() -> u64 {
    30
}

fn validate_models(models: &[String]) -> Result<(), validator::ValidationError> {
    if models.iter().any(|m| m.trim().is_empty()) {
        return Err(validator::ValidationError::new("Model identifiers must not be blank"));
    }
    Ok(())
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: default_models(),
            timeout_seconds: default_timeout_seconds()
        }
    }
}

/// Retry policy.
///
/// Outer attempts run `0..=max_retries`; the wait before attempt `n + 1` is
/// `base_delay_ms * 2^n`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    #[validate(range(max = 10))]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    #[validate(range(max = 60000))]
    pub base_delay_ms: u64
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms()
        }
    }
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 1000))]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    #[validate(range(min = 1, max = 65536))]
    pub max_output_tokens: u32
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens()
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port()
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid log level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_metrics_enabled()
        }
    }
}
