//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles. Unset or unparsable variables leave the field unset, so lower
//! layers and defaults still apply.
//!
//! # Naming Convention
//! - `GEMINI_*`: Upstream API settings
//! - `SUGGEST_*`: Retry, generation and logging settings
//! - `HOST` / `PORT`: HTTP bind address

use crate::layer::{
    ConfigLayer, GenerationLayer, ObservabilityLayer, RetryLayer, ServerLayer, UpstreamLayer
};
use std::env;
use task_core::ApiKey;

/// Environment variable holding the upstream credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Load configuration from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Environment variables override the config file but can be overridden by
/// CLI arguments. Only variables that are set produce a value in the layer.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// let layer = load_from_env();
/// if let Some(port) = layer.server.port {
///     println!("PORT overrides the bind port: {port}");
/// }
/// ```
///
/// ## Environment Variables
/// ### Upstream (`GEMINI_*`)
/// - `GEMINI_API_KEY`: API key (no default; blank counts as unset)
/// - `GEMINI_BASE_URL`: API root
/// - `GEMINI_MODELS`: Comma separated fallback list
/// - `GEMINI_TIMEOUT_SECONDS`: Per-call timeout (default: 30)
///
/// ### Suggestion pipeline (`SUGGEST_*`)
/// - `SUGGEST_MAX_RETRIES`: Outer retries (default: 3)
/// - `SUGGEST_BASE_DELAY_MS`: Backoff base (default: 1000)
/// - `SUGGEST_TEMPERATURE`, `SUGGEST_TOP_K`, `SUGGEST_TOP_P`,
///   `SUGGEST_MAX_OUTPUT_TOKENS`: Generation parameters
/// - `SUGGEST_LOG_LEVEL`: trace/debug/info/warn/error (default: "info")
/// - `SUGGEST_METRICS_ENABLED`: true/false (default: true)
///
/// ### Server
/// - `HOST`: Bind host (default: "0.0.0.0")
/// - `PORT`: Bind port (default: 8080)
///
/// Unparsable values are logged and ignored.
pub fn load_from_env() -> ConfigLayer {
    ConfigLayer {
        upstream: load_upstream_from_env(),
        retry: load_retry_from_env(),
        generation: load_generation_from_env(),
        server: load_server_from_env(),
        observability: load_observability_from_env()
    }
}

fn load_upstream_from_env() -> UpstreamLayer {
    UpstreamLayer {
        api_key: env::var(API_KEY_ENV).ok().and_then(ApiKey::new),
        base_url: env::var("GEMINI_BASE_URL").ok(),
        models: env::var("GEMINI_MODELS")
            .ok()
            .map(|raw| parse_list(&raw))
            .filter(|models| !models.is_empty()),
        timeout_seconds: env_value("GEMINI_TIMEOUT_SECONDS")
    }
}

fn load_retry_from_env() -> RetryLayer {
    RetryLayer {
        max_retries: env_value("SUGGEST_MAX_RETRIES"),
        base_delay_ms: env_value("SUGGEST_BASE_DELAY_MS")
    }
}

fn load_generation_from_env() -> GenerationLayer {
    GenerationLayer {
        temperature: env_value("SUGGEST_TEMPERATURE"),
        top_k: env_value("SUGGEST_TOP_K"),
        top_p: env_value("SUGGEST_TOP_P"),
        max_output_tokens: env_value("SUGGEST_MAX_OUTPUT_TOKENS")
    }
}

fn load_server_from_env() -> ServerLayer {
    ServerLayer {
        host: env::var("HOST").ok(),
        port: env_value("PORT")
    }
}

fn load_observability_from_env() -> ObservabilityLayer {
    ObservabilityLayer {
        log_level: env::var("SUGGEST_LOG_LEVEL")
            .ok()
            .map(|level| level.trim().to_ascii_lowercase()),
        metrics_enabled: env_value("SUGGEST_METRICS_ENABLED")
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// `None` when `key` is unset or does not parse.
fn env_value<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    match parse_env(key) {
        Ok(value) => Some(value),
        Err(ParseEnvError::Unset) => None,
        Err(ParseEnvError::Invalid(e)) => {
            tracing::warn!(variable = key, error = %e, "Ignoring unparsable environment variable");
            None
        }
    }
}

#[derive(Debug)]
enum ParseEnvError {
    Unset,
    Invalid(Box<dyn std::error::Error + Send + Sync>)
}

fn parse_env<T>(key: &str) -> Result<T, ParseEnvError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    let raw = env::var(key).map_err(|_| ParseEnvError::Unset)?;
    raw.trim()
        .parse::<T>()
        .map_err(|e| ParseEnvError::Invalid(Box::new(e)))
}
