//! Structured outcome returned by every gatekeeper operation.

use crate::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tagged outcome of a tool invocation.
///
/// Serialises as a flat JSON object: `success`, the payload fields, and
/// `error`/`error_kind` when the call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation specific fields.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    /// Human readable failure cause, always set when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine readable failure kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ToolResult {
    /// Successful result carrying the fields of `payload`.
    ///
    /// Non-object payloads are stored under a `result` key.
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload: into_map(payload),
            error: None,
            error_kind: None,
        }
    }

    /// Failed result with a message and no payload.
    pub fn failure(kind: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Map::new(),
            error: Some(message.into()),
            error_kind: Some(kind.to_string()),
        }
    }

    /// Attach diagnostic fields to a result.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload.extend(into_map(payload));
        self
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Render the result as a JSON value for the caller.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.payload.len() + 3);
        object.insert("success".to_string(), Value::Bool(self.success));
        for (key, value) in &self.payload {
            object.insert(key.clone(), value.clone());
        }
        if let Some(error) = &self.error {
            object.insert("error".to_string(), Value::String(error.clone()));
        }
        if let Some(kind) = &self.error_kind {
            object.insert("error_kind".to_string(), Value::String(kind.clone()));
        }
        Value::Object(object)
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        let mut result = ToolResult::failure(err.kind(), err.to_string());
        if let ToolError::Timeout { seconds } = err {
            result.payload.insert("timeout".to_string(), Value::from(seconds));
        }
        result
    }
}

fn into_map(payload: Value) -> Map<String, Value> {
    match payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}
