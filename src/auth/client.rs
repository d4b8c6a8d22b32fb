use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::session::{Session, SessionStore, User};
use crate::{
    config::AuthConfig,
    error::{EstimateError, Result},
};

/// Fields sent to the signup endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the account backend. Successful logins and signups are written
/// to the injected [`SessionStore`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    config: AuthConfig,
    sessions: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(config: AuthConfig, sessions: Arc<SessionStore>) -> Self {
        Self { config, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let body = json!({ "email": email, "password": password });
        self.authenticate("login", &body, "Login failed").await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<Session> {
        let body = serde_json::to_value(request)
            .map_err(|err| EstimateError::Auth(format!("failed to encode signup: {err}")))?;
        self.authenticate("signup", &body, "Signup failed").await
    }

    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await
    }

    async fn authenticate(&self, endpoint: &str, body: &Value, fallback: &str) -> Result<Session> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|err| EstimateError::Network(format!("failed to build HTTP client: {err}")))?;

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        debug!(target: "trip_budget::auth", url = %url, "sending auth request");

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        let parsed: AuthResponse = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    target: "trip_budget::auth",
                    status = status.as_u16(),
                    error = %err,
                    "auth response is not JSON"
                );
                debug!(target: "trip_budget::auth", body = %response_text);
                return Err(EstimateError::Auth(fallback.to_string()));
            }
        };

        match parsed {
            AuthResponse {
                success: true,
                token: Some(token),
                user,
                ..
            } if status.is_success() && !token.is_empty() => {
                let user = match user {
                    Some(Value::Object(fields)) => User::new(fields),
                    _ => body
                        .get("email")
                        .and_then(Value::as_str)
                        .map(User::with_email)
                        .unwrap_or_default(),
                };
                let session = Session { token, user };
                self.sessions.set(session.clone()).await?;
                info!(target: "trip_budget::auth", endpoint, "authenticated");
                Ok(session)
            }
            AuthResponse { error, .. } => {
                let message = error.unwrap_or_else(|| fallback.to_string());
                warn!(
                    target: "trip_budget::auth",
                    endpoint,
                    status = status.as_u16(),
                    error = %message,
                    "authentication rejected"
                );
                Err(EstimateError::Auth(message))
            }
        }
    }
}
