//! Utility helpers shared by built-in tools.

use agentos_rs_protocol::ToolError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse JSON args into a typed struct for tool calls.
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments(err.to_string()))
}

/// Serialise a gatekeeper payload for a `ToolResult`.
pub(super) fn to_payload<T: Serialize>(payload: &T) -> Result<Value, ToolError> {
    serde_json::to_value(payload)
        .map_err(|err| ToolError::Unexpected(format!("failed to encode result: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{parse_args, to_payload};
    use agentos_rs_protocol::ToolError;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Args {
        name: String,
        #[serde(default)]
        limit: Option<u64>,
    }

    #[test]
    fn parse_args_reads_struct_fields() {
        let args: Args = parse_args(json!({ "name": "agentos" })).expect("args");
        assert_eq!(args.name, "agentos");
        assert_eq!(args.limit, None);
    }

    #[test]
    fn parse_args_rejects_unknown_and_missing_fields() {
        let err = parse_args::<Args>(json!({ "name": "x", "extra": 1 })).expect_err("unknown");
        assert!(matches!(err, ToolError::InvalidArguments(ref msg) if msg.contains("extra")));

        let err = parse_args::<Args>(json!({})).expect_err("missing");
        assert!(matches!(err, ToolError::InvalidArguments(ref msg) if msg.contains("name")));
    }

    #[test]
    fn null_args_mean_no_fields() {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Empty {}

        parse_args::<Empty>(serde_json::Value::Null).expect("empty args");
    }

    #[test]
    fn payloads_serialise_as_objects() {
        #[derive(Serialize)]
        struct Payload {
            size: u64,
        }
        assert_eq!(to_payload(&Payload { size: 5 }).expect("payload"), json!({ "size": 5 }));
    }
}
