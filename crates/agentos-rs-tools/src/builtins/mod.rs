//! Built-in tools bundled with AgentOS.

mod filesystem;
mod shell;
mod utils;

use crate::ToolRegistry;
use crate::files::FileGatekeeper;
use agentos_rs_sandbox::CommandGatekeeper;
use log::info;
use std::sync::Arc;

pub use filesystem::{CreateFileTool, DeleteFileTool, GetFileInfoTool, ListFilesTool, ReadFileTool};
pub use shell::{CheckCommandSafetyTool, ExecuteCommandTool, ListAllowedCommandsTool, SystemInfoTool};

/// Register all built-in tools with the provided registry.
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    commands: Arc<CommandGatekeeper>,
    files: Arc<FileGatekeeper>,
) {
    registry.register(Arc::new(ExecuteCommandTool::new(commands.clone())));
    registry.register(Arc::new(ListAllowedCommandsTool::new(commands.clone())));
    registry.register(Arc::new(SystemInfoTool::new(commands.clone())));
    registry.register(Arc::new(CheckCommandSafetyTool::new(commands)));
    registry.register(Arc::new(CreateFileTool::new(files.clone())));
    registry.register(Arc::new(ReadFileTool::new(files.clone())));
    registry.register(Arc::new(ListFilesTool::new(files.clone())));
    registry.register(Arc::new(DeleteFileTool::new(files.clone())));
    registry.register(Arc::new(GetFileInfoTool::new(files)));
    info!("registered built-in tools (count={})", registry.list().len());
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry(
    commands: Arc<CommandGatekeeper>,
    files: Arc<FileGatekeeper>,
) -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry, commands, files);
    registry
}
