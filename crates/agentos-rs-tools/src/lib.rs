//! Tool registry and the built-in AgentOS tools.
//!
//! The command tools wrap [`agentos_rs_sandbox::CommandGatekeeper`]; the file
//! tools wrap [`FileGatekeeper`], which lives here.

pub mod builtins;
pub mod files;
pub mod registry;
pub mod tool;

/// Built-in tool registry and registration helper.
pub use builtins::{builtin_tool_registry, register_builtin_tools};
/// File gatekeeper and its payload types.
pub use files::{
    ALLOWED_EXTENSIONS, CreatedFile, DeletedFile, FileContent, FileEntry, FileError,
    FileGatekeeper, FileInfo, FileListing, FilePolicy, PathSanitizer, TextEncoding,
};
/// Tool registry type.
pub use registry::ToolRegistry;
/// Tool trait and spec type.
pub use tool::{Tool, ToolSpec};
