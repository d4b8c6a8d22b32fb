//! trip-budget-rs: cost estimates for temple pilgrimages, backed by an
//! OpenAI-compatible chat-completion API.
//!
//! The pipeline is stateless: a [`TripRequest`] is turned into a prompt, sent
//! once to the inference endpoint, and the reply is parsed, validated and
//! reconciled into a [`CostBreakdown`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_budget_rs::{Estimator, TravelMode, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = TripRequest::builder()
//!         .origin("Delhi")
//!         .destination("Tirupati")
//!         .travel_mode(TravelMode::Flight)
//!         .build()?;
//!
//!     let estimator = Estimator::from_env()?;
//!     let breakdown = estimator.estimate(&request).await?;
//!     println!("{}", breakdown.summary(&request));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod types;

pub use auth::{AuthClient, Session, SessionStore, SignupRequest, User};
pub use config::{
    ApiKeyProvider, AuthConfig, EnvApiKey, EstimatorConfig, RetryPolicy, StaticApiKey,
};
pub use core::{CancelHandle, Estimator};
pub use error::{EstimateError, Result};
pub use services::chat_client::{ChatClient, CompletionBackend};
pub use services::normalizer::{normalize, strip_code_fences};
pub use services::prompt::build_prompt;
pub use types::{format_inr, BudgetLevel, CostBreakdown, EstimatePayload, TravelMode, TripRequest};

#[cfg(feature = "cli")]
pub mod cli;
