//! Caller-facing contract shared by every AgentOS gatekeeper.
//!
//! Gatekeeper operations report to their callers with a [`ToolResult`]; the
//! failure causes they can report are enumerated by [`ToolError`].

mod result;
mod tool;

pub use result::ToolResult;
pub use tool::ToolError;
