//! Tool trait definition and metadata spec.

use agentos_rs_protocol::{ToolError, ToolResult};
use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

/// Tool metadata spec for discovery and schema presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool arguments.
    pub args_schema: Value,
}

/// Interface for executable tools.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Return the tool name.
    fn name(&self) -> &str;
    /// Return the tool description.
    fn description(&self) -> &str;
    /// Return the JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Run the tool. Failures that the caller should see are `Err`.
    async fn call(&self, args: Value) -> Result<ToolResult, ToolError>;

    /// Run the tool and fold every error into a `success=false` result.
    async fn invoke(&self, args: Value) -> ToolResult {
        match self.call(args).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    "tool call failed (tool={}, kind={}, error={err})",
                    self.name(),
                    err.kind()
                );
                ToolResult::from(err)
            }
        }
    }

    /// Build a `ToolSpec` describing this tool.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}
