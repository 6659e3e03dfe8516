//! Built-in command tools backed by a [`CommandGatekeeper`].

use crate::Tool;
use crate::builtins::utils::{parse_args, to_payload};
use agentos_rs_protocol::{ToolError, ToolResult};
use agentos_rs_sandbox::CommandGatekeeper;
use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExecuteArgs {
    command: String,
    #[serde(default)]
    timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SafetyArgs {
    command: String,
}

fn no_args_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

/// Validate and run a whitelisted shell command.
#[derive(Debug, Clone)]
pub struct ExecuteCommandTool {
    gatekeeper: Arc<CommandGatekeeper>,
}

impl ExecuteCommandTool {
    pub fn new(gatekeeper: Arc<CommandGatekeeper>) -> Self {
        Self { gatekeeper }
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a whitelisted shell command in the sandbox directory"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Command line; the first word must be whitelisted"
                },
                "timeout": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Timeout in seconds, 0 or absent uses the policy default"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: ExecuteArgs = parse_args(args)?;
        let outcome = match self.gatekeeper.execute(&input.command, input.timeout).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let err = ToolError::from(err);
                warn!("execute_command failed (kind={}, error={err})", err.kind());
                return Ok(ToolResult::from(err).with_payload(json!({ "command": input.command })));
            }
        };
        info!(
            "execute_command finished (return_code={}, elapsed_ms={}, truncated={})",
            outcome.return_code, outcome.execution_time_ms, outcome.output_truncated
        );
        let payload = to_payload(&outcome)?;
        if outcome.succeeded() {
            return Ok(ToolResult::ok(payload));
        }
        Ok(ToolResult::failure(
            "execution_failed",
            format!("Command failed with return code {}", outcome.return_code),
        )
        .with_payload(payload))
    }
}

/// Report the whitelist and the policy constants.
#[derive(Debug, Clone)]
pub struct ListAllowedCommandsTool {
    gatekeeper: Arc<CommandGatekeeper>,
}

impl ListAllowedCommandsTool {
    pub fn new(gatekeeper: Arc<CommandGatekeeper>) -> Self {
        Self { gatekeeper }
    }
}

#[async_trait]
impl Tool for ListAllowedCommandsTool {
    fn name(&self) -> &str {
        "list_allowed_commands"
    }

    fn description(&self) -> &str {
        "List the commands that execute_command accepts"
    }

    fn args_schema(&self) -> Value {
        no_args_schema()
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let _: NoArgs = parse_args(args)?;
        let allowed = self.gatekeeper.list_allowed_commands();
        Ok(ToolResult::ok(to_payload(&allowed)?))
    }
}

/// Platform metadata plus a few whitelisted diagnostic commands.
#[derive(Debug, Clone)]
pub struct SystemInfoTool {
    gatekeeper: Arc<CommandGatekeeper>,
}

impl SystemInfoTool {
    pub fn new(gatekeeper: Arc<CommandGatekeeper>) -> Self {
        Self { gatekeeper }
    }
}

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        "get_system_info"
    }

    fn description(&self) -> &str {
        "Report platform details, the current user, date and disk usage"
    }

    fn args_schema(&self) -> Value {
        no_args_schema()
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let _: NoArgs = parse_args(args)?;
        let info = self.gatekeeper.system_info().await;
        Ok(ToolResult::ok(to_payload(&info)?))
    }
}

/// Dry-run a command against the whitelist and denylist.
#[derive(Debug, Clone)]
pub struct CheckCommandSafetyTool {
    gatekeeper: Arc<CommandGatekeeper>,
}

impl CheckCommandSafetyTool {
    pub fn new(gatekeeper: Arc<CommandGatekeeper>) -> Self {
        Self { gatekeeper }
    }
}

#[async_trait]
impl Tool for CheckCommandSafetyTool {
    fn name(&self) -> &str {
        "check_command_safety"
    }

    fn description(&self) -> &str {
        "Analyse a command without running it and list every rule it violates"
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Command line to analyse"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let input: SafetyArgs = parse_args(args)?;
        let report = self.gatekeeper.check_command_safety(&input.command);
        Ok(ToolResult::ok(json!({ "analysis": to_payload(&report)? })))
    }
}
