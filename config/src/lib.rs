//! # Configuration System
//!
//! Centralized configuration for the subtask suggestion service.
//!
//! This crate provides:
//! - Configuration structures for the upstream client, retry policy,
//!   generation parameters, HTTP server and logging
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Partial per-source layers ([`ConfigLayer`])
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod layer;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{
    GenerationConfig, ObservabilityConfig, RetryConfig, ServerConfig, SuggestConfig,
    UpstreamConfig
};
pub use layer::{
    ConfigLayer, GenerationLayer, ObservabilityLayer, RetryLayer, ServerLayer, UpstreamLayer
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::{API_KEY_ENV, load_from_env};
pub use precedence::merge_configs;
pub use validation::{ConfigError, resolve_config, validate};
pub use validator::Validate;
