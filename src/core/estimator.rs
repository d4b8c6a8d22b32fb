use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    config::{ApiKeyProvider, EnvApiKey, EstimatorConfig},
    core::cancel::CancelHandle,
    error::{EstimateError, Result},
    services::{
        chat_client::{ChatClient, CompletionBackend},
        normalizer::normalize,
        prompt::{build_prompt, SYSTEM_INSTRUCTION},
    },
    types::{breakdown::CostBreakdown, trip::TripRequest},
};

/// Entry point of the pipeline: prompt, one completion call, normalization.
///
/// Stateless between calls; share it freely behind `&` or `Arc`.
#[derive(Clone, Debug)]
pub struct Estimator {
    backend: Arc<dyn CompletionBackend>,
}

impl Estimator {
    pub fn new(config: EstimatorConfig, api_keys: impl ApiKeyProvider + 'static) -> Self {
        Self::with_backend(ChatClient::new(config, api_keys))
    }

    pub fn with_backend(backend: impl CompletionBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Configuration and API key from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(EstimatorConfig::from_env()?, EnvApiKey::default()))
    }

    pub async fn estimate(&self, request: &TripRequest) -> Result<CostBreakdown> {
        let prompt = build_prompt(request);
        info!(
            target: "trip_budget::estimate",
            origin = request.origin(),
            destination = request.destination(),
            travelers = request.traveler_count(),
            "requesting cost estimate"
        );
        debug!(target: "trip_budget::estimate", prompt = %prompt);

        let raw = match self.backend.complete(SYSTEM_INSTRUCTION, &prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    target: "trip_budget::estimate",
                    code = err.error_code(),
                    error = %err,
                    "completion failed"
                );
                return Err(err);
            }
        };

        let breakdown = match normalize(&raw, request) {
            Ok(breakdown) => breakdown,
            Err(err) => {
                warn!(
                    target: "trip_budget::estimate",
                    code = err.error_code(),
                    error = %err,
                    "normalization failed"
                );
                return Err(err);
            }
        };

        info!(
            target: "trip_budget::estimate",
            total = breakdown.total_cost,
            per_person = breakdown.per_person_cost,
            "estimate ready"
        );
        Ok(breakdown)
    }

    /// Like [`estimate`](Self::estimate), but abandons the request as soon as
    /// `cancel` fires. The in-flight HTTP call is dropped and no result is applied.
    pub async fn estimate_with_cancel(
        &self,
        request: &TripRequest,
        cancel: &CancelHandle,
    ) -> Result<CostBreakdown> {
        if cancel.is_cancelled() {
            return Err(EstimateError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(target: "trip_budget::estimate", "estimation cancelled");
                Err(EstimateError::Cancelled)
            }
            result = self.estimate(request) => result,
        }
    }
}
