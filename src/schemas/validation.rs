use crate::{
    error::{EstimateError, Result},
    schemas::SchemaHandle,
};
use jsonschema::{error::ValidationErrorKind, Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

const MAX_REPORTED: usize = 3;
const ROOT: &str = "<root>";

/// One place where a payload departs from its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Violation {
    /// Dotted path to the offending value, the missing key included
    pub path: String,
    pub reason: String,
}

/// Every violation of `schema` found in `payload`, in validator order.
pub(crate) fn collect_violations(schema: &SchemaHandle, payload: &Value) -> Result<Vec<Violation>> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
        .map_err(|err| {
            EstimateError::Schema(format!(
                "failed to prepare `{}` schema: {}",
                schema.schema_name(),
                err
            ))
        })?;

    let violations = match validator.validate(payload) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|error| {
                let mut segments: Vec<String> = error
                    .instance_path
                    .to_string()
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect();

                let reason = match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        segments.push(match property {
                            Value::String(key) => key.clone(),
                            other => other.to_string(),
                        });
                        "required field is missing".to_string()
                    }
                    _ => error.to_string(),
                };

                let path = if segments.is_empty() {
                    ROOT.to_string()
                } else {
                    segments.join(".")
                };
                Violation { path, reason }
            })
            .collect(),
    };

    Ok(violations)
}

/// Check `payload` against `schema`, reporting the first few violations by path.
pub(crate) fn validate_structured_payload(schema: &SchemaHandle, payload: &Value) -> Result<()> {
    let violations = collect_violations(schema, payload)?;
    if violations.is_empty() {
        return Ok(());
    }

    let mut detail = violations
        .iter()
        .take(MAX_REPORTED)
        .map(|violation| format!("`{}`: {}", violation.path, violation.reason))
        .collect::<Vec<_>>()
        .join("; ");
    if violations.len() > MAX_REPORTED {
        detail.push_str(&format!(" (and {} more)", violations.len() - MAX_REPORTED));
    }

    debug!(
        target: "trip_budget::normalize",
        schema = schema.schema_name(),
        violations = violations.len(),
        payload = %payload,
        "payload rejected by schema"
    );

    Err(EstimateError::Schema(format!(
        "payload does not match `{}`: {}",
        schema.schema_name(),
        detail
    )))
}
