//! Server setup and lifecycle for the suggestion server.

use std::net::SocketAddr;
use std::sync::Arc;

use config::SuggestConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::signal;

use crate::error::{Result, ServerError};
use crate::routes::create_router;
use crate::state::AppState;

/// The suggestion HTTP server.
pub struct SuggestServer {
    state: Arc<AppState>
}

impl SuggestServer {
    /// Creates a server backed by the Gemini client.
    pub fn new(config: SuggestConfig) -> Result<Self> {
        let metrics = install_metrics(&config);
        let state = AppState::new(config)?.with_metrics(metrics);
        Ok(Self::with_state(Arc::new(state)))
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Runs the HTTP server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| ServerError::Configuration(format!("Invalid address: {e}")))?;

        if !self.state.is_configured() {
            tracing::warn!(
                "No Gemini API key configured; suggestion requests will fail until one is set"
            );
        }

        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(
            %addr,
            models = ?self.state.orchestrator.models(),
            "Suggestion server starting"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {e}")))?;

        tracing::info!("Suggestion server stopped");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

/// Installs the global Prometheus recorder when metrics are enabled.
///
/// A recorder can only be installed once per process; later attempts are
/// logged and leave metrics disabled.
pub fn install_metrics(config: &SuggestConfig) -> Option<PrometheusHandle> {
    if !config.observability.metrics_enabled {
        return None;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// Runs the server with the given configuration.
pub async fn run_server(config: SuggestConfig) -> Result<()> {
    SuggestServer::new(config)?.run().await
}

/// Entry point for containerized deployments: tracing and configuration
/// both come from the environment.
pub async fn run_from_env() -> Result<()> {
    let config = config::resolve_config(None, None)
        .map_err(|e| ServerError::Configuration(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level))
        )
        .init();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_disabled_by_config() {
        let mut config = SuggestConfig::default();
        config.observability.metrics_enabled = false;
        assert!(install_metrics(&config).is_none());
    }

    #[tokio::test]
    async fn test_invalid_bind_address_is_configuration_error() {
        let mut config = SuggestConfig::default();
        config.server.host = "not a host".to_string();
        config.observability.metrics_enabled = false;

        let result = SuggestServer::new(config).unwrap().run().await;
        assert!(matches!(result, Err(ServerError::Configuration(_))));
    }
}
