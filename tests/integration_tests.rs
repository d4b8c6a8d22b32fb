mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use common::{envelope, tirupati_payload, tirupati_request};
use mockito::Matcher;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use trip_budget_rs::{
    build_prompt, CancelHandle, CompletionBackend, EstimateError, Estimator, EstimatorConfig,
    RetryPolicy, StaticApiKey,
};

#[derive(Debug, Clone)]
struct RecordingBackend {
    reply: String,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingBackend {
    fn replying(reply: String) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> trip_budget_rs::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_message.to_string()));
        Ok(self.reply.clone())
    }
}

#[derive(Debug)]
struct StalledBackend;

#[async_trait]
impl CompletionBackend for StalledBackend {
    async fn complete(&self, _: &str, _: &str) -> trip_budget_rs::Result<String> {
        std::future::pending().await
    }
}

fn estimator_for(server: &mockito::ServerGuard) -> Estimator {
    let config = EstimatorConfig::default()
        .with_base_url(server.url())
        .with_timeout(Duration::from_secs(5));
    Estimator::new(config, StaticApiKey::new("test-key"))
}

#[tokio::test]
async fn test_estimate_sends_wire_contract() {
    let mut server = mockito::Server::new_async().await;
    let request = tirupati_request();

    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama-3.3-70b-versatile",
            "temperature": 0.7,
            "max_tokens": 2048,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "system",
                    "content": "You are a travel budget expert specializing in Indian temple tourism. Always respond with valid JSON only, no markdown formatting."
                },
                { "role": "user", "content": build_prompt(&request) }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(&tirupati_payload().to_string()))
        .expect(1)
        .create_async()
        .await;

    let breakdown = assert_ok!(estimator_for(&server).estimate(&request).await);
    assert_eq!(breakdown.total_cost, 26100);
    assert_eq!(breakdown.per_person_cost, 13050);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fenced_content_is_accepted() {
    let mut server = mockito::Server::new_async().await;
    let content = format!("```json\n{}\n```", tirupati_payload());

    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(envelope(&content))
        .create_async()
        .await;

    let breakdown = assert_ok!(estimator_for(&server).estimate(&tirupati_request()).await);
    assert_eq!(breakdown.total_cost, 26100);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
        .expect(1)
        .create_async()
        .await;

    let err = assert_err!(estimator_for(&server).estimate(&tirupati_request()).await);
    match &err {
        EstimateError::Upstream { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert!(err.is_retryable());
    assert!(!err.user_message().contains("Invalid API Key"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_retry_by_default() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(1)
        .create_async()
        .await;

    let err = assert_err!(estimator_for(&server).estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Upstream { status: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_once_policy_repeats_transient_failure() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(2)
        .create_async()
        .await;

    let config = EstimatorConfig::default()
        .with_base_url(server.url())
        .with_retry(RetryPolicy::Once);
    let estimator = Estimator::new(config, StaticApiKey::new("test-key"));

    let err = assert_err!(estimator.estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Upstream { status: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_envelope_without_content_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)
        .create_async()
        .await;

    let err = assert_err!(estimator_for(&server).estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_envelope_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = assert_err!(estimator_for(&server).estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_prose_reply_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(envelope("Sorry, I cannot help."))
        .create_async()
        .await;

    let err = assert_err!(estimator_for(&server).estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Parse { .. }));
}

#[tokio::test]
async fn test_missing_api_key_fails_before_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = EstimatorConfig::default().with_base_url(server.url());
    let no_key: Option<StaticApiKey> = None;
    let estimator = Estimator::new(config.clone(), no_key);
    let err = assert_err!(estimator.estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Configuration(_)));
    assert!(!err.is_retryable());

    let blank = Estimator::new(config, StaticApiKey::new("  "));
    let err = assert_err!(blank.estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Configuration(_)));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let config = EstimatorConfig::default()
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let estimator = Estimator::new(config, StaticApiKey::new("test-key"));

    let err = assert_err!(estimator.estimate(&tirupati_request()).await);
    assert!(matches!(err, EstimateError::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_silent_endpoint_times_out_as_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = EstimatorConfig::default()
        .with_base_url(format!("http://{addr}"))
        .with_timeout(Duration::from_millis(200));
    let estimator = Estimator::new(config, StaticApiKey::new("test-key"));

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        estimator.estimate(&tirupati_request()),
    )
    .await
    .expect("request should give up within the configured timeout");

    let err = assert_err!(result);
    assert!(matches!(err, EstimateError::Network(_)));
    assert!(err.is_retryable());
    server.abort();
}

#[tokio::test]
async fn test_backend_receives_prompt_and_system_instruction() {
    let backend = RecordingBackend::replying(tirupati_payload().to_string());
    let estimator = Estimator::with_backend(backend.clone());
    let request = tirupati_request();

    assert_ok!(estimator.estimate(&request).await);
    assert_ok!(estimator.estimate(&request).await);

    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.contains("valid JSON only"));
    assert_eq!(calls[0].1, build_prompt(&request));
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn test_cancel_abandons_in_flight_request() {
    let estimator = Estimator::with_backend(StalledBackend);
    let cancel = CancelHandle::new();
    let request = tirupati_request();

    let task = {
        let estimator = estimator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { estimator.estimate_with_cancel(&request, &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("cancellation should resolve promptly")
        .unwrap();
    assert!(matches!(result, Err(EstimateError::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_handle_skips_network() {
    let backend = RecordingBackend::replying(tirupati_payload().to_string());
    let estimator = Estimator::with_backend(backend.clone());
    let cancel = CancelHandle::new();
    cancel.cancel();

    let err = assert_err!(
        estimator
            .estimate_with_cancel(&tirupati_request(), &cancel)
            .await
    );
    assert!(matches!(err, EstimateError::Cancelled));
    assert!(backend.calls.lock().unwrap().is_empty());
}
