//! Turns raw assistant text into a reconciled [`CostBreakdown`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{EstimateError, Result},
    schemas::{estimate_schema, validation::validate_structured_payload},
    types::{
        breakdown::{CostBreakdown, EstimatePayload},
        trip::TripRequest,
    },
};

const SNIPPET_LIMIT: usize = 200;

/// Remove a surrounding Markdown code fence (with or without a language tag)
/// and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse, validate and reconcile an assistant response for `request`.
pub fn normalize(raw: &str, request: &TripRequest) -> Result<CostBreakdown> {
    let text = strip_code_fences(raw);
    debug!(target: "trip_budget::normalize", cleaned = %text, "cleaned response");

    let value: Value = serde_json::from_str(text).map_err(|err| {
        warn!(
            target: "trip_budget::normalize",
            error = %err,
            raw = %raw,
            "assistant text is not valid JSON"
        );
        EstimateError::Parse {
            snippet: truncate(text, SNIPPET_LIMIT),
            message: err.to_string(),
        }
    })?;

    normalize_value(value, request.traveler_count())
}

/// Validate an already-parsed payload and reconcile its aggregates.
pub fn normalize_value(value: Value, traveler_count: u32) -> Result<CostBreakdown> {
    let schema = estimate_schema();
    validate_structured_payload(schema, &value)?;

    let payload: EstimatePayload = serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() {
            "<root>".to_string()
        } else {
            path
        };
        EstimateError::Schema(format!(
            "failed to deserialize `{}` at {}: {}",
            schema.schema_name(),
            location,
            err.inner()
        ))
    })?;

    Ok(reconcile(payload, traveler_count))
}

/// Fill in `totalCost` and `perPersonCost` when the upstream left them absent or zero.
///
/// Non-zero upstream values are kept as-is.
pub fn reconcile(payload: EstimatePayload, traveler_count: u32) -> CostBreakdown {
    let total_cost = match payload.total_cost {
        Some(total) if total > 0 => total,
        _ => {
            let total = payload.categories_total();
            debug!(target: "trip_budget::normalize", total, "recomputed totalCost");
            total
        }
    };

    let per_person_cost = match payload.per_person_cost {
        Some(per_person) if per_person > 0 => per_person,
        _ => split_evenly(total_cost, traveler_count),
    };

    CostBreakdown {
        transportation: payload.transportation,
        accommodation: payload.accommodation,
        food: payload.food,
        local_transport: payload.local_transport,
        temple_and_activities: payload.temple_and_activities,
        miscellaneous: payload.miscellaneous,
        total_cost,
        per_person_cost,
        recommendations: payload.recommendations,
    }
}

/// `round(total / travelers)` with halves rounded up. A zero count is treated as one.
fn split_evenly(total: u64, traveler_count: u32) -> u64 {
    let travelers = u64::from(traveler_count.max(1));
    let quotient = total / travelers;
    let remainder = total % travelers;
    if remainder * 2 >= travelers {
        quotient + 1
    } else {
        quotient
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", text.chars().take(limit).collect::<String>())
    } else {
        text.to_string()
    }
}
