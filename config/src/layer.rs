//! # Configuration Layers
//!
//! A layer is a partial configuration produced by one source (file,
//! environment, CLI). Every field is optional: `Some` means the source set
//! it, `None` means the source is silent and lower layers stay in effect.

use serde::Deserialize;
use task_core::ApiKey;

/// Partial configuration from one source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub upstream: UpstreamLayer,
    pub retry: RetryLayer,
    pub generation: GenerationLayer,
    pub server: ServerLayer,
    pub observability: ObservabilityLayer
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamLayer {
    /// Blank values read as unset.
    #[serde(deserialize_with = "ApiKey::deserialize_optional")]
    pub api_key: Option<ApiKey>,
    pub base_url: Option<String>,
    pub models: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryLayer {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationLayer {
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerLayer {
    pub host: Option<String>,
    pub port: Option<u16>
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObservabilityLayer {
    pub log_level: Option<String>,
    pub metrics_enabled: Option<bool>
}

impl ConfigLayer {
    /// True when the source set nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
