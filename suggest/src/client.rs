//! # Gemini Client
//!
//! `UpstreamClient` over the Gemini `generateContent` REST endpoint.
//!
//! One call is one HTTP request. Status codes are classified into
//! `TransportFailure`s; the body of a successful response is handed back
//! untouched for the parser to inspect.

use std::time::Duration;

use async_trait::async_trait;
use config::{GenerationConfig, UpstreamConfig};
use errors::{SuggestionError, TransportFailure};
use serde::Serialize;
use task_core::{ApiKey, RawResponse, UpstreamClient};
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_LOGGED_BODY: usize = 512;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationParams
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens
        }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    generation: GenerationParams
}

impl GeminiClient {
    pub fn new(
        upstream: &UpstreamConfig,
        generation: &GenerationConfig
    ) -> Result<Self, SuggestionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_seconds))
            .build()
            .map_err(|e| {
                SuggestionError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            generation: GenerationParams::from(generation)
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl UpstreamClient for GeminiClient {
    async fn call(
        &self,
        model: &str,
        prompt: &str,
        credential: &ApiKey
    ) -> Result<RawResponse, TransportFailure> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }]
            }],
            generation_config: self.generation
        };

        let response = self
            .http
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {e}")
                };
                TransportFailure::network(model, message)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportFailure::network(model, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            warn!(
                model,
                status = status.as_u16(),
                body = truncate(&text, MAX_LOGGED_BODY),
                "Upstream returned an error status"
            );
            return Err(TransportFailure::status(
                model,
                status.as_u16(),
                format!("upstream returned {status}")
            ));
        }

        match serde_json::from_str::<RawResponse>(&text) {
            Ok(raw) => {
                debug!(model, candidates = raw.candidates.len(), "Upstream call succeeded");
                Ok(raw)
            }
            Err(e) => {
                warn!(model, error = %e, "Upstream body is not a generateContent response");
                Ok(RawResponse::default())
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::TransportKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let upstream = UpstreamConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
            ..Default::default()
        };
        GeminiClient::new(&upstream, &GenerationConfig::default()).unwrap()
    }

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    #[tokio::test]
    async fn test_call_sends_prompt_and_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "Break it down"}]}],
                "generationConfig": {"topK": 40, "maxOutputTokens": 1024}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "1. Draft timeline"}], "role": "model"},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .call("gemini-1.5-flash", "Break it down", &key())
            .await
            .unwrap();

        assert_eq!(raw, RawResponse::from_text("1. Draft timeline"));
    }

    #[tokio::test]
    async fn test_credential_not_in_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        client_for(&server)
            .call("gemini-1.5-flash", "prompt", &key())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].url.as_str().contains("test-key"));
    }

    #[tokio::test]
    async fn test_status_classification() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/busy:generateContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/limited:generateContent"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/broken:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let busy = client.call("busy", "p", &key()).await.unwrap_err();
        assert_eq!(busy.kind, TransportKind::Overloaded);
        assert_eq!(busy.model, "busy");

        let limited = client.call("limited", "p", &key()).await.unwrap_err();
        assert_eq!(limited.kind, TransportKind::QuotaExceeded);

        let broken = client.call("broken", "p", &key()).await.unwrap_err();
        assert_eq!(broken.kind, TransportKind::Status(500));
        assert!(!broken.message.contains("internal"));
    }

    #[tokio::test]
    async fn test_non_json_success_yields_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .call("gemini-1.5-flash", "prompt", &key())
            .await
            .unwrap();

        assert!(raw.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_failure() {
        let upstream = UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let client = GeminiClient::new(&upstream, &GenerationConfig::default()).unwrap();

        let failure = client
            .call("gemini-1.5-flash", "prompt", &key())
            .await
            .unwrap_err();

        assert_eq!(failure.kind, TransportKind::Network);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let upstream = UpstreamConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new(&upstream, &GenerationConfig::default()).unwrap();
        assert_eq!(
            client.endpoint("gemini-1.5-pro"),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("short", 10), "short");
    }
}
