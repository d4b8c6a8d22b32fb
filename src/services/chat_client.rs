use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    config::{ApiKeyProvider, EstimatorConfig, RetryPolicy},
    error::{EstimateError, Result},
};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Anything that can answer a single system + user chat turn with raw text.
#[async_trait]
pub trait CompletionBackend: Send + Sync + fmt::Debug {
    async fn complete(&self, system_instruction: &str, user_message: &str) -> Result<String>;
}

/// Chat-completion client for OpenAI-compatible inference endpoints.
#[derive(Clone)]
pub struct ChatClient {
    config: EstimatorConfig,
    api_keys: Arc<dyn ApiKeyProvider>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .field("retry", &self.config.retry)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(config: EstimatorConfig, api_keys: impl ApiKeyProvider + 'static) -> Self {
        Self {
            config,
            api_keys: Arc::new(api_keys),
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn resolve_api_key(&self) -> Result<String> {
        self.api_keys
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EstimateError::Configuration(format!(
                    "no API key available from {:?}",
                    self.api_keys
                ))
            })
    }

    /// POST the body and return the parsed response envelope.
    pub async fn chat_completion(&self, api_key: &str, body: &Value) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|err| EstimateError::Network(format!("failed to build HTTP client: {err}")))?;

        let request_url = build_chat_url(&self.config.base_url);
        let max_attempts = match self.config.retry {
            RetryPolicy::Never => 1,
            RetryPolicy::Once => 2,
        };
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(target: "trip_budget::client", url = %request_url, attempt, "sending chat completion");

            let sent = client
                .post(&request_url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(err) => {
                    let error = EstimateError::from(err);
                    if attempt < max_attempts {
                        warn!(target: "trip_budget::client", error = %error, "retrying after transport failure");
                        tokio::time::sleep(RETRY_BACKOFF).await;
                        continue;
                    }
                    return Err(error);
                }
            };

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                warn!(target: "trip_budget::client", status = status.as_u16(), "inference endpoint returned an error status");
                debug!(target: "trip_budget::client", body = %response_text, "error response body");

                if is_transient(status) && attempt < max_attempts {
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    continue;
                }

                return Err(EstimateError::Upstream {
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            debug!(target: "trip_budget::client", body = %response_text, "response envelope");

            let envelope: Value = serde_json::from_str(&response_text).map_err(|err| {
                EstimateError::MalformedResponse(format!("response envelope is not JSON: {err}"))
            })?;

            if let Some(error) = envelope.get("error") {
                let error_message = error
                    .get("message")
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| error.to_string());
                return Err(EstimateError::MalformedResponse(format!(
                    "envelope carries an error: {}",
                    error_message
                )));
            }

            return Ok(envelope);
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        let api_key = self.resolve_api_key()?;

        let body = ChatCompletionRequest::new(
            self.config.model.clone(),
            vec![
                json!({ "role": "system", "content": system_instruction }),
                json!({ "role": "user", "content": user_message }),
            ],
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(Some(self.config.max_tokens))
        .with_response_format(json!({ "type": "json_object" }))
        .into_value();

        let envelope = self.chat_completion(&api_key, &body).await?;
        extract_message_content(&envelope)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

/// Pull `choices[0].message.content` out of a response envelope.
pub fn extract_message_content(envelope: &Value) -> Result<String> {
    let content = envelope
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| {
            EstimateError::MalformedResponse(
                "missing `choices[0].message.content` in response".to_string(),
            )
        })?;

    if content.trim().is_empty() {
        return Err(EstimateError::MalformedResponse(
            "assistant message content is empty".to_string(),
        ));
    }

    Ok(content.to_string())
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}
