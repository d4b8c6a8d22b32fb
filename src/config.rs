//! Runtime configuration for the estimator and the auth client.
//!
//! Values come from builder methods or from the environment (`.env` files are
//! loaded by the CLI through `dotenvy`).

use std::{env, fmt, str::FromStr, time::Duration};

use crate::error::{EstimateError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:5000/api/auth";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Environment variables consulted for the inference API key, in order.
pub const API_KEY_VARS: &[&str] = &["GROQ_API_KEY", "OPENAI_API_KEY"];

/// Whether a failed estimation request is attempted a second time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Single attempt per user action
    #[default]
    Never,
    /// One more attempt after a transport failure, 429 or 5xx
    Once,
}

impl FromStr for RetryPolicy {
    type Err = EstimateError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "never" | "none" | "0" => Ok(Self::Never),
            "once" | "1" => Ok(Self::Once),
            other => Err(EstimateError::Configuration(format!(
                "unknown retry policy `{other}` (expected never or once)"
            ))),
        }
    }
}

/// Settings for the inference endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::Never,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl EstimatorConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Defaults overridden by `GROQ_BASE_URL`, `TRIP_BUDGET_MODEL`,
    /// `TRIP_BUDGET_TIMEOUT_SECS` and `TRIP_BUDGET_RETRY`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("GROQ_BASE_URL").or_else(|_| env::var("OPENAI_BASE_URL")) {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("TRIP_BUDGET_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = env::var("TRIP_BUDGET_TIMEOUT_SECS") {
            let seconds: u64 = raw.trim().parse().map_err(|_| {
                EstimateError::Configuration(format!(
                    "TRIP_BUDGET_TIMEOUT_SECS must be a whole number of seconds, got `{raw}`"
                ))
            })?;
            config.timeout = Duration::from_secs(seconds);
        }
        if let Ok(raw) = env::var("TRIP_BUDGET_RETRY") {
            config.retry = raw.parse()?;
        }

        Ok(config)
    }
}

/// Source of the inference API key.
///
/// Consulted on every estimation so a key added after start-up is picked up;
/// `None` fails the call with a configuration error before any network traffic.
pub trait ApiKeyProvider: Send + Sync + fmt::Debug {
    fn api_key(&self) -> Option<String>;
}

/// A key supplied directly, e.g. from a CLI flag.
#[derive(Clone)]
pub struct StaticApiKey(String);

impl StaticApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Debug for StaticApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticApiKey(<redacted>)")
    }
}

impl ApiKeyProvider for StaticApiKey {
    fn api_key(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl ApiKeyProvider for Option<StaticApiKey> {
    fn api_key(&self) -> Option<String> {
        self.as_ref().and_then(StaticApiKey::api_key)
    }
}

/// Reads the key from the first set, non-empty environment variable.
#[derive(Clone, Debug)]
pub struct EnvApiKey {
    vars: Vec<String>,
}

impl EnvApiKey {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EnvApiKey {
    fn default() -> Self {
        Self::new(API_KEY_VARS.iter().copied())
    }
}

impl ApiKeyProvider for EnvApiKey {
    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    }
}

/// Settings for the account backend.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AUTH_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl AuthConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Defaults overridden by `TRIP_BUDGET_AUTH_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("TRIP_BUDGET_AUTH_URL") {
            config.base_url = base_url;
        }
        config
    }
}
