//! Application state for the suggestion server.

use std::sync::Arc;

use config::SuggestConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use suggest::{GeminiClient, Orchestrator};
use task_core::UpstreamClient;

use crate::error::{Result, ServerError};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    /// Effective configuration.
    pub config: SuggestConfig,
    /// Orchestrator over the configured upstream client.
    pub orchestrator: Orchestrator<dyn UpstreamClient>,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>
}

impl AppState {
    /// Creates state backed by the Gemini client.
    pub fn new(config: SuggestConfig) -> Result<Self> {
        let client = GeminiClient::new(&config.upstream, &config.generation)
            .map_err(|e| ServerError::Configuration(e.to_string()))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Creates state over an arbitrary upstream client.
    pub fn with_client(config: SuggestConfig, client: Arc<dyn UpstreamClient>) -> Self {
        let orchestrator = Orchestrator::from_config(client, &config);
        Self {
            config,
            orchestrator,
            metrics: None
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Whether a credential is present.
    pub fn is_configured(&self) -> bool {
        self.config.upstream.api_key.is_some()
    }
}
