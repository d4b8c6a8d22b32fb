use thiserror::Error;

/// Main error type for the estimation pipeline
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status}")]
    Upstream { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to parse estimate JSON: {message}")]
    Parse { snippet: String, message: String },

    #[error("Estimate does not match the expected schema: {0}")]
    Schema(String),

    #[error("Estimation cancelled")]
    Cancelled,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EstimateError>;

const RETRY_NOTICE: &str =
    "Failed to generate budget estimate. Please check your connection and try again.";

impl EstimateError {
    /// Check if the user may retry the whole pipeline after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EstimateError::Network(_)
                | EstimateError::Upstream { .. }
                | EstimateError::MalformedResponse(_)
                | EstimateError::Parse { .. }
                | EstimateError::Schema(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::Configuration(_) => "CONFIGURATION_ERROR",
            EstimateError::InvalidRequest(_) => "INVALID_REQUEST",
            EstimateError::Network(_) => "NETWORK_ERROR",
            EstimateError::Upstream { .. } => "UPSTREAM_ERROR",
            EstimateError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            EstimateError::Parse { .. } => "PARSE_ERROR",
            EstimateError::Schema(_) => "SCHEMA_ERROR",
            EstimateError::Cancelled => "CANCELLED",
            EstimateError::Auth(_) => "AUTH_ERROR",
            EstimateError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Message suitable for an end user.
    ///
    /// Pipeline failures collapse into one generic retry notice; raw bodies and
    /// model output stay in the logs.
    pub fn user_message(&self) -> String {
        if self.is_retryable() {
            return RETRY_NOTICE.to_string();
        }

        match self {
            EstimateError::Configuration(_) => {
                "API key missing. Add your inference API key and try again.".to_string()
            }
            EstimateError::Cancelled => "Estimation was cancelled.".to_string(),
            other => other.to_string(),
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.user_message(),
                "retryable": self.is_retryable()
            }
        })
    }
}

impl From<reqwest::Error> for EstimateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EstimateError::Network(format!("request timed out: {err}"))
        } else {
            EstimateError::Network(err.to_string())
        }
    }
}
