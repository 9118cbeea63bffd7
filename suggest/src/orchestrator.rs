//! # Suggestion Orchestrator
//!
//! Drives one suggestion request through the model fallback list and the
//! outer backoff loop.
//!
//! The control flow is an explicit state machine. Each outer attempt walks
//! every model in order; the first non-empty parse wins. When every model of
//! an attempt fails, the orchestrator backs off for `base_delay * 2^attempt`
//! and starts over from the first model, until `max_retries` is spent.

use std::sync::Arc;
use std::time::Duration;

use config::{RetryConfig, SuggestConfig};
use errors::{ErrorKind, SuggestionError};
use metrics::counter;
use task_core::{
    ApiKey, AttemptOutcome, ModelAttempt, Sleeper, SuggestionRequest, SuggestionResult,
    TokioSleeper, UpstreamClient
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::parser::{extract_text, parse_suggestions};
use crate::prompt::build_prompt;

pub const TITLE_REQUIRED: &str = "Task title is required";
pub const API_KEY_MISSING: &str = "Gemini API key not configured";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Attempting { attempt: u32, model_index: usize },
    Backoff { attempt: u32 },
    Succeeded(SuggestionResult),
    ExhaustedRetryable,
    FailedFast(SuggestionError)
}

/// Result of one orchestration together with every attempt it made.
#[derive(Debug, Clone)]
pub struct Orchestration {
    pub outcome: Result<SuggestionResult, SuggestionError>,
    pub attempts: Vec<ModelAttempt>
}

impl Orchestration {
    /// Outer attempts after the first.
    pub fn retries(&self) -> u32 {
        self.attempts.iter().map(|a| a.attempt).max().unwrap_or(0)
    }
}

pub struct Orchestrator<C: UpstreamClient + ?Sized, S: Sleeper = TokioSleeper> {
    client: Arc<C>,
    sleeper: S,
    models: Vec<String>,
    retry: RetryConfig
}

impl<C: UpstreamClient + ?Sized> Orchestrator<C, TokioSleeper> {
    pub fn new(client: Arc<C>, models: Vec<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            models,
            retry
        }
    }

    pub fn from_config(client: Arc<C>, config: &SuggestConfig) -> Self {
        Self::new(client, config.upstream.models.clone(), config.retry.clone())
    }
}

impl<C: UpstreamClient + ?Sized, S: Sleeper> Orchestrator<C, S> {
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> Orchestrator<C, T> {
        Orchestrator {
            client: self.client,
            sleeper,
            models: self.models,
            retry: self.retry
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Wait inserted before outer attempt `attempt + 1`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.retry.base_delay_ms.saturating_mul(factor))
    }

    pub async fn generate(
        &self,
        request: &SuggestionRequest,
        credential: Option<&ApiKey>
    ) -> Result<SuggestionResult, SuggestionError> {
        self.run(request, credential).await.outcome
    }

    /// Runs the full fallback and retry policy for `request`.
    ///
    /// Validation and configuration errors are returned before any upstream
    /// call. After exhaustion the error is the most specific failure seen in
    /// the final outer attempt.
    pub async fn run(
        &self,
        request: &SuggestionRequest,
        credential: Option<&ApiKey>
    ) -> Orchestration {
        let span = info_span!(
            "suggest.generate",
            title_length = request.title.trim().len(),
            has_description = request.description().is_some(),
            models = self.models.len(),
            max_retries = self.retry.max_retries
        );

        async move {
            counter!("suggest_requests_total").increment(1);

            let mut attempts = Vec::new();
            let outcome = match self.preflight(request, credential) {
                Ok(credential) => {
                    let prompt = build_prompt(&request.title, request.description());
                    self.drive(&prompt, credential, &mut attempts).await
                }
                Err(err) => Err(err)
            };

            match &outcome {
                Ok(result) => info!(
                    suggestions = result.len(),
                    calls = attempts.len(),
                    "Suggestions generated"
                ),
                Err(err) => {
                    counter!("suggest_failures_total", "kind" => err.kind().to_string())
                        .increment(1);
                    warn!(
                        kind = %err.kind(),
                        calls = attempts.len(),
                        error = %err,
                        "Suggestion generation failed"
                    );
                }
            }

            Orchestration { outcome, attempts }
        }
        .instrument(span)
        .await
    }

    fn preflight<'a>(
        &self,
        request: &SuggestionRequest,
        credential: Option<&'a ApiKey>
    ) -> Result<&'a ApiKey, SuggestionError> {
        if !request.has_title() {
            return Err(SuggestionError::validation(TITLE_REQUIRED));
        }
        let credential = credential
            .filter(|key| !key.expose().trim().is_empty())
            .ok_or_else(|| SuggestionError::configuration(API_KEY_MISSING))?;
        if self.models.is_empty() {
            return Err(SuggestionError::configuration("No upstream models configured"));
        }
        Ok(credential)
    }

    async fn drive(
        &self,
        prompt: &str,
        credential: &ApiKey,
        attempts: &mut Vec<ModelAttempt>
    ) -> Result<SuggestionResult, SuggestionError> {
        let mut stage = Stage::Attempting {
            attempt: 0,
            model_index: 0
        };
        let mut worst: Option<SuggestionError> = None;

        loop {
            stage = match stage {
                Stage::Attempting {
                    attempt,
                    model_index
                } => {
                    if model_index == 0 {
                        worst = None;
                    }
                    match self.models.get(model_index) {
                        Some(model) => {
                            let (outcome, result) =
                                self.attempt_model(model, attempt, prompt, credential).await;
                            attempts.push(ModelAttempt {
                                model: model.clone(),
                                attempt,
                                outcome
                            });
                            match result {
                                Ok(suggestions) => Stage::Succeeded(suggestions),
                                Err(err) if err.is_fail_fast() => Stage::FailedFast(err),
                                Err(err) => {
                                    worst = Some(more_specific(worst.take(), err));
                                    Stage::Attempting {
                                        attempt,
                                        model_index: model_index + 1
                                    }
                                }
                            }
                        }
                        None if attempt >= self.retry.max_retries => Stage::ExhaustedRetryable,
                        None => Stage::Backoff { attempt }
                    }
                }
                Stage::Backoff { attempt } => {
                    let delay = self.backoff_delay(attempt);
                    counter!("suggest_retries_total").increment(1);
                    info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "All models failed, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    Stage::Attempting {
                        attempt: attempt + 1,
                        model_index: 0
                    }
                }
                Stage::Succeeded(result) => return Ok(result),
                Stage::ExhaustedRetryable => {
                    return Err(worst.unwrap_or_else(|| SuggestionError::Unknown {
                        message: "all attempts failed".to_string()
                    }));
                }
                Stage::FailedFast(err) => return Err(err)
            };
        }
    }

    async fn attempt_model(
        &self,
        model: &str,
        attempt: u32,
        prompt: &str,
        credential: &ApiKey
    ) -> (AttemptOutcome, Result<SuggestionResult, SuggestionError>) {
        let (outcome, result) = match self.client.call(model, prompt, credential).await {
            Ok(raw) => match extract_text(&raw) {
                Ok(text) => {
                    let suggestions = parse_suggestions(text);
                    if suggestions.is_empty() {
                        (AttemptOutcome::EmptyResult, Err(SuggestionError::EmptyResult))
                    } else {
                        (
                            AttemptOutcome::Succeeded {
                                suggestions: suggestions.len()
                            },
                            Ok(suggestions)
                        )
                    }
                }
                Err(err) => (AttemptOutcome::InvalidResponse, Err(err))
            },
            Err(failure) => (
                AttemptOutcome::Failed { kind: failure.kind },
                Err(SuggestionError::from(failure))
            )
        };

        let label = outcome.label();
        counter!(
            "suggest_upstream_calls_total",
            "model" => model.to_string(),
            "outcome" => label.clone()
        )
        .increment(1);

        match &result {
            Ok(_) => debug!(model, attempt, outcome = %label, "Model call succeeded"),
            Err(err) => warn!(model, attempt, outcome = %label, error = %err, "Model call failed, falling back")
        }

        (outcome, result)
    }
}

fn more_specific(current: Option<SuggestionError>, candidate: SuggestionError) -> SuggestionError {
    match current {
        Some(current) if rank(&current) >= rank(&candidate) => current,
        _ => candidate
    }
}

fn rank(err: &SuggestionError) -> u8 {
    ErrorKind::specificity(err.kind())
}
