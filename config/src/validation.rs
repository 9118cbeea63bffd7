//! # Configuration Validation
//!
//! Validates the merged configuration and resolves it from every source in
//! one call.

use crate::config::SuggestConfig;
use crate::file_loader::{ConfigFileError, load_from_file};
use crate::layer::ConfigLayer;
use crate::loader::load_from_env;
use crate::precedence::merge_configs;
use std::path::Path;
use validator::Validate;

/// Error raised while resolving the effective configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors)
}

/// Validate configuration structure.
///
/// # M-CANONICAL-DOCS
///
/// ## Usage
/// ```rust,no_run
/// use config::{SuggestConfig, validate};
///
/// let config = SuggestConfig::default();
/// match validate(&config) {
///     Ok(()) => println!("Configuration is valid"),
///     Err(errors) => println!("Validation errors: {:?}", errors),
/// }
/// ```
///
/// ## Validation Rules
/// ### Upstream
/// - `base_url`: must be a URL
/// - `models`: 1-8 entries, none blank
/// - `timeout_seconds`: 1-300
///
/// ### Retry
/// - `max_retries`: 0-10
/// - `base_delay_ms`: 0-60000
///
/// ### Generation
/// - `temperature`: 0.0-2.0
/// - `top_k`: 1-1000
/// - `top_p`: 0.0-1.0
/// - `max_output_tokens`: 1-65536
///
/// ### Server
/// - `host`: 1-255 characters
/// - `port`: 1-65535
///
/// ### Observability
/// - `log_level`: must be "trace", "debug", "info", "warn", or "error"
///
/// A missing `api_key` is not a validation error. Generation reports it as a
/// configuration error instead, so the service can still start and answer
/// health checks.
pub fn validate(config: &SuggestConfig) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

/// Resolve the effective configuration: defaults, then `file` (if any), then
/// the environment, then `cli` (if any). The result is validated.
pub fn resolve_config(
    file: Option<&Path>,
    cli: Option<ConfigLayer>
) -> Result<SuggestConfig, ConfigError> {
    let from_file = match file {
        Some(path) => load_from_file(path)?,
        None => ConfigLayer::default()
    };
    let from_env = load_from_env();

    let config = merge_configs(
        SuggestConfig::default(),
        from_file,
        "file",
        from_env,
        "env",
        cli,
        "cli"
    );
    validate(&config)?;
    Ok(config)
}
