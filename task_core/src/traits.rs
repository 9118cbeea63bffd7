use std::time::Duration;

use async_trait::async_trait;
use errors::TransportFailure;

use crate::types::{ApiKey, RawResponse};

/// One-shot transport to a generative-language model.
///
/// Implementations issue exactly one request per call and never retry;
/// retry and fallback policy belong to the caller.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn call(
        &self,
        model: &str,
        prompt: &str,
        credential: &ApiKey
    ) -> Result<RawResponse, TransportFailure>;
}

/// Suspension used between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Non-blocking sleep on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
