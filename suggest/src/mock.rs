//! Scripted stand-ins for the upstream and the backoff timer.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use errors::{TransportFailure, TransportKind};
use task_core::{ApiKey, RawResponse, Sleeper, UpstreamClient};

type Scripted = Result<RawResponse, TransportFailure>;

#[derive(Default)]
struct Script {
    queued: VecDeque<Scripted>,
    repeat: Option<Scripted>
}

/// One recorded upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String
}

/// `UpstreamClient` answering from per-model scripts.
///
/// Queued answers are consumed first, then the repeated answer (if any).
/// A model with nothing left to answer fails with a network failure.
#[derive(Default)]
pub struct MockUpstreamClient {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<RecordedCall>>
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one answer for `model`.
    pub fn respond(self, model: &str, answer: Scripted) -> Self {
        lock(&self.scripts)
            .entry(model.to_string())
            .or_default()
            .queued
            .push_back(answer);
        self
    }

    pub fn respond_text(self, model: &str, text: &str) -> Self {
        self.respond(model, Ok(RawResponse::from_text(text)))
    }

    pub fn fail(self, model: &str, kind: TransportKind) -> Self {
        let failure = TransportFailure::new(kind, model, format!("scripted {kind} failure"));
        self.respond(model, Err(failure))
    }

    /// Answers every call to `model` with `answer` once the queue is empty.
    pub fn always(self, model: &str, answer: Scripted) -> Self {
        lock(&self.scripts)
            .entry(model.to_string())
            .or_default()
            .repeat = Some(answer);
        self
    }

    pub fn always_fail(self, model: &str, kind: TransportKind) -> Self {
        let failure = TransportFailure::new(kind, model, format!("scripted {kind} failure"));
        self.always(model, Err(failure))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Models called, in call order.
    pub fn models_called(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.model.clone()).collect()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn call(
        &self,
        model: &str,
        prompt: &str,
        _credential: &ApiKey
    ) -> Result<RawResponse, TransportFailure> {
        lock(&self.calls).push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string()
        });

        let mut scripts = lock(&self.scripts);
        let Some(script) = scripts.get_mut(model) else {
            return Err(TransportFailure::network(model, "no scripted answer"));
        };

        script
            .queued
            .pop_front()
            .or_else(|| script.repeat.clone())
            .unwrap_or_else(|| Err(TransportFailure::network(model, "script exhausted")))
    }
}

/// `Sleeper` that records requested durations and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn durations(&self) -> Vec<Duration> {
        lock(&self.slept).clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.slept).push(duration);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_repeat() {
        let key = ApiKey::new("k").unwrap();
        let client = MockUpstreamClient::new()
            .fail("m", TransportKind::Overloaded)
            .always("m", Ok(RawResponse::from_text("1. ok")));

        assert!(client.call("m", "p", &key).await.is_err());
        assert!(client.call("m", "p", &key).await.is_ok());
        assert!(client.call("m", "p", &key).await.is_ok());
        assert!(client.call("other", "p", &key).await.is_err());
        assert_eq!(client.models_called(), vec!["m", "m", "m", "other"]);
    }
}
