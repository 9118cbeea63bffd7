//! Route definitions for the suggestion server.

use axum::{
    Router,
    routing::{get, post}
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer
};

use crate::handlers;
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser clients call the API from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/suggest-subtasks", post(handlers::suggest_subtasks))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{HealthResponse, SuggestResponse};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header}
    };
    use config::SuggestConfig;
    use errors::TransportKind;
    use serde_json::{Value, json};
    use suggest::MockUpstreamClient;
    use task_core::ApiKey;
    use tower::ServiceExt;

    const FLASH: &str = "gemini-1.5-flash";
    const PRO: &str = "gemini-1.5-pro";

    fn config(with_key: bool) -> SuggestConfig {
        let mut config = SuggestConfig::default();
        config.retry.max_retries = 0;
        config.retry.base_delay_ms = 0;
        if with_key {
            config.upstream.api_key = ApiKey::new("test-key");
        }
        config
    }

    fn router(client: MockUpstreamClient, with_key: bool) -> (Arc<MockUpstreamClient>, Router) {
        let client = Arc::new(client);
        let state = AppState::with_client(config(with_key), client.clone());
        (client, create_router(Arc::new(state)))
    }

    fn suggest_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/suggest-subtasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_suggest_returns_parsed_list() {
        let (client, app) = router(
            MockUpstreamClient::new().respond_text(
                FLASH,
                "1. Draft timeline\n2. Notify stakeholders\n3. Book venue"
            ),
            true
        );

        let response = app
            .oneshot(suggest_request(
                r#"{"title":"Plan launch","description":"Q3 release"}"#
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: SuggestResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body.suggestions,
            vec!["Draft timeline", "Notify stakeholders", "Book venue"]
        );
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_title_is_bad_request() {
        let (client, app) = router(MockUpstreamClient::new(), true);

        let response = app.oneshot(suggest_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Task title is required");
        assert_eq!(body["code"], "validation");
        assert_eq!(body["retry"], "never");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_null_or_blank_title_is_validation_error() {
        let (client, app) = router(MockUpstreamClient::new(), true);

        for body in [r#"{"title":null}"#, r#"{"title":"   ","description":"x"}"#] {
            let response = app.clone().oneshot(suggest_request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let json = json_body(response).await;
            assert_eq!(json["error"], "Task title is required");
            assert_eq!(json["code"], "validation");
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_key_is_server_error() {
        let (client, app) = router(MockUpstreamClient::new(), false);

        let response = app
            .oneshot(suggest_request(r#"{"title":"Plan launch"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Gemini API key not configured");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_overloaded_maps_to_503() {
        let (_client, app) = router(
            MockUpstreamClient::new()
                .always_fail(FLASH, TransportKind::Overloaded)
                .always_fail(PRO, TransportKind::Overloaded),
            true
        );

        let response = app
            .oneshot(suggest_request(r#"{"title":"Plan launch"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"], "AI service currently overloaded, retry shortly");
        assert_eq!(body["retry"], "later");
    }

    #[tokio::test]
    async fn test_quota_maps_to_429() {
        let (_client, app) = router(
            MockUpstreamClient::new()
                .always_fail(FLASH, TransportKind::QuotaExceeded)
                .always_fail(PRO, TransportKind::QuotaExceeded),
            true
        );

        let response = app
            .oneshot(suggest_request(r#"{"title":"Plan launch"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(response).await["error"], "API quota exceeded");
    }

    #[tokio::test]
    async fn test_empty_result_maps_to_500() {
        let (_client, app) = router(
            MockUpstreamClient::new()
                .respond_text(FLASH, "\n\n")
                .respond_text(PRO, ""),
            true
        );

        let response = app
            .oneshot(suggest_request(r#"{"title":"Plan launch"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No valid suggestions generated");
        assert_eq!(body["code"], "empty_result");
        assert_eq!(body["retry"], "now");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (client, app) = router(MockUpstreamClient::new(), true);

        let response = app.oneshot(suggest_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(body["code"], "invalid_body");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let (_client, app) = router(MockUpstreamClient::new(), false);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "healthy");
        assert!(!health.configured);
        assert_eq!(health.models, vec![FLASH, PRO]);
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let (_client, app) = router(MockUpstreamClient::new(), true);

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (_client, app) = router(MockUpstreamClient::new(), true);

        let response = app
            .oneshot(
                Request::post("/api/other")
                    .body(Body::from(json!({"title": "x"}).to_string()))
                    .unwrap()
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
