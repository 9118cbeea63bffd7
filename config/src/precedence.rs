//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! Every field a layer sets wins over the layers below it, including values
//! equal to the defaults. Fields a layer leaves unset never mask a lower one.

use std::fmt::Display;

use crate::config::{
    GenerationConfig, ObservabilityConfig, RetryConfig, ServerConfig, SuggestConfig,
    UpstreamConfig
};
use crate::layer::{
    ConfigLayer, GenerationLayer, ObservabilityLayer, RetryLayer, ServerLayer, UpstreamLayer
};

/// Merge multiple configuration sources with precedence.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Merges configuration from multiple sources following precedence rules:
/// CLI arguments > environment variables > config file > defaults.
///
/// ## Usage
/// ```rust,no_run
/// use config::{SuggestConfig, load_from_env, load_from_file, merge_configs};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let defaults = SuggestConfig::default();
///     let from_file = load_from_file(Path::new("taskpilot.toml"))?;
///     let from_env = load_from_env();
///
///     let _config = merge_configs(defaults, from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
///
/// ## Logging
/// Every applied override is logged at info level with its source. The
/// credential is always logged as `***`.
pub fn merge_configs(
    defaults: SuggestConfig,
    file_layer: ConfigLayer,
    file_source_name: &str,
    env_layer: ConfigLayer,
    env_source_name: &str,
    cli_layer: Option<ConfigLayer>,
    cli_source_name: &str
) -> SuggestConfig {
    let mut config = defaults;

    apply_with_logging(&mut config, file_layer, file_source_name);
    apply_with_logging(&mut config, env_layer, env_source_name);

    if let Some(cli) = cli_layer {
        apply_with_logging(&mut config, cli, cli_source_name);
    }

    config
}

fn apply_with_logging(base: &mut SuggestConfig, layer: ConfigLayer, source_name: &str) {
    let mut changes = Vec::new();

    apply_upstream(&mut base.upstream, layer.upstream, &mut changes);
    apply_retry(&mut base.retry, layer.retry, &mut changes);
    apply_generation(&mut base.generation, layer.generation, &mut changes);
    apply_server(&mut base.server, layer.server, &mut changes);
    apply_observability(&mut base.observability, layer.observability, &mut changes);

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }
}

/// Writes `value` into `field` when set; records a change when it differs.
fn set<T: PartialEq + Display>(
    field: &mut T,
    value: Option<T>,
    name: &str,
    changes: &mut Vec<String>
) {
    if let Some(value) = value {
        if *field != value {
            changes.push(format!("{name} = {value}"));
        }
        *field = value;
    }
}

fn apply_upstream(base: &mut UpstreamConfig, layer: UpstreamLayer, changes: &mut Vec<String>) {
    if let Some(api_key) = layer.api_key {
        if base.api_key.as_ref() != Some(&api_key) {
            changes.push("upstream.api_key = ***".to_string());
        }
        base.api_key = Some(api_key);
    }
    set(&mut base.base_url, layer.base_url, "upstream.base_url", changes);
    if let Some(models) = layer.models {
        if base.models != models {
            changes.push(format!("upstream.models = {}", models.join(",")));
        }
        base.models = models;
    }
    set(
        &mut base.timeout_seconds,
        layer.timeout_seconds,
        "upstream.timeout_seconds",
        changes
    );
}

fn apply_retry(base: &mut RetryConfig, layer: RetryLayer, changes: &mut Vec<String>) {
    set(&mut base.max_retries, layer.max_retries, "retry.max_retries", changes);
    set(&mut base.base_delay_ms, layer.base_delay_ms, "retry.base_delay_ms", changes);
}

fn apply_generation(base: &mut GenerationConfig, layer: GenerationLayer, changes: &mut Vec<String>) {
    set(&mut base.temperature, layer.temperature, "generation.temperature", changes);
    set(&mut base.top_k, layer.top_k, "generation.top_k", changes);
    set(&mut base.top_p, layer.top_p, "generation.top_p", changes);
    set(
        &mut base.max_output_tokens,
        layer.max_output_tokens,
        "generation.max_output_tokens",
        changes
    );
}

fn apply_server(base: &mut ServerConfig, layer: ServerLayer, changes: &mut Vec<String>) {
    set(&mut base.host, layer.host, "server.host", changes);
    set(&mut base.port, layer.port, "server.port", changes);
}

fn apply_observability(
    base: &mut ObservabilityConfig,
    layer: ObservabilityLayer,
    changes: &mut Vec<String>
) {
    set(&mut base.log_level, layer.log_level, "observability.log_level", changes);
    set(
        &mut base.metrics_enabled,
        layer.metrics_enabled,
        "observability.metrics_enabled",
        changes
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_core::ApiKey;

    fn port_layer(port: u16) -> ConfigLayer {
        ConfigLayer {
            server: ServerLayer {
                port: Some(port),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_configs_precedence() {
        let file_layer = ConfigLayer {
            server: ServerLayer {
                host: Some("127.0.0.1".to_string()),
                ..Default::default()
            },
            retry: RetryLayer {
                max_retries: Some(5),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(
            SuggestConfig::default(),
            file_layer,
            "file",
            port_layer(9999),
            "env",
            None,
            "cli"
        );

        assert_eq!(merged.server.host, "127.0.0.1");
        assert_eq!(merged.server.port, 9999);
        assert_eq!(merged.retry.max_retries, 5);
    }

    #[test]
    fn test_merge_cli_overrides_all() {
        let merged = merge_configs(
            SuggestConfig::default(),
            port_layer(3000),
            "file",
            port_layer(4000),
            "env",
            Some(port_layer(5000)),
            "cli"
        );

        assert_eq!(merged.server.port, 5000);
    }

    #[test]
    fn test_default_valued_override_still_wins() {
        let file_layer = ConfigLayer {
            retry: RetryLayer {
                max_retries: Some(5),
                ..Default::default()
            },
            observability: ObservabilityLayer {
                metrics_enabled: Some(false),
                ..Default::default()
            },
            server: ServerLayer {
                port: Some(3000),
                ..Default::default()
            },
            ..Default::default()
        };
        let env_layer = ConfigLayer {
            retry: RetryLayer {
                max_retries: Some(3),
                ..Default::default()
            },
            observability: ObservabilityLayer {
                metrics_enabled: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(
            SuggestConfig::default(),
            file_layer,
            "file",
            env_layer,
            "env",
            Some(port_layer(8080)),
            "cli"
        );

        assert_eq!(merged.retry.max_retries, 3);
        assert!(merged.observability.metrics_enabled);
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_apply_upstream_redacts_key() {
        let mut base = UpstreamConfig {
            api_key: ApiKey::new("old-key"),
            ..Default::default()
        };
        let layer = UpstreamLayer {
            api_key: ApiKey::new("new-key"),
            models: Some(vec!["gemini-2.0-flash".to_string()]),
            ..Default::default()
        };

        let mut changes = Vec::new();
        apply_upstream(&mut base, layer, &mut changes);

        assert_eq!(base.api_key.as_ref().map(ApiKey::expose), Some("new-key"));
        assert_eq!(base.models, vec!["gemini-2.0-flash"]);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], "upstream.api_key = ***");
        assert!(changes.iter().all(|c| !c.contains("new-key")));
    }

    #[test]
    fn test_absent_key_does_not_clear_base() {
        let mut base = UpstreamConfig {
            api_key: ApiKey::new("file-key"),
            ..Default::default()
        };

        let mut changes = Vec::new();
        apply_upstream(&mut base, UpstreamLayer::default(), &mut changes);

        assert_eq!(base.api_key.as_ref().map(ApiKey::expose), Some("file-key"));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_apply_generation() {
        let mut base = GenerationConfig::default();
        let layer = GenerationLayer {
            temperature: Some(0.1),
            top_k: Some(10),
            top_p: Some(0.95),
            ..Default::default()
        };

        let mut changes = Vec::new();
        apply_generation(&mut base, layer, &mut changes);

        assert_eq!(base.temperature, 0.1);
        assert_eq!(base.top_k, 10);
        assert_eq!(base.top_p, 0.95);
        assert_eq!(changes, vec!["generation.temperature = 0.1", "generation.top_k = 10"]);
    }
}
