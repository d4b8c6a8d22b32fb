use schemars::schema::RootSchema;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

use crate::types::breakdown::EstimatePayload;

/// Cached JSON schema handle for a structured response type.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    schema_name: &'static str,
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema(schema_name: &'static str, root: RootSchema) -> Self {
        let schema_json = serde_json::to_value(root).unwrap_or_else(|err| {
            panic!("failed to serialize schema for {}: {}", schema_name, err)
        });

        Self {
            schema_name,
            schema_json: Arc::new(schema_json),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    /// Top-level keys the schema marks as required.
    pub fn required_keys(&self) -> Vec<&str> {
        self.schema_json
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Schema the inference endpoint's estimate payload must satisfy.
pub fn estimate_schema() -> &'static SchemaHandle {
    static HANDLE: OnceLock<SchemaHandle> = OnceLock::new();
    HANDLE.get_or_init(|| {
        let root = schemars::schema_for!(EstimatePayload);
        SchemaHandle::from_root_schema("CostBreakdown", root)
    })
}
