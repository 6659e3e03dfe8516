//! Sandbox error types.

use agentos_rs_protocol::ToolError;

/// Why the validator refused a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    /// Input was empty or whitespace only.
    #[error("Empty command provided")]
    EmptyCommand,
    /// Base command is not on the whitelist.
    #[error("Command '{base}' not allowed. Allowed commands: {}", .allowed.join(", "))]
    CommandNotWhitelisted {
        /// First whitespace token of the command.
        base: String,
        /// Sorted whitelist at the time of rejection.
        allowed: Vec<String>,
    },
    /// A denylisted substring appears somewhere in the command.
    #[error("Dangerous pattern detected: {0}")]
    DangerousPatternDetected(String),
}

/// Errors returned by the command gatekeeper and process runner.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Rejected before anything was spawned.
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
    /// Process exceeded its time budget and was killed.
    #[error("Command timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    /// Executable could not be resolved or spawned.
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    /// OS refused to execute the command.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid sandbox configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Command execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl SandboxError {
    /// Classify a spawn failure by its OS error kind.
    pub(crate) fn from_spawn(base: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::CommandNotFound(format!("{base}: {err}")),
            std::io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(format!("{base}: {err}"))
            }
            _ => Self::Io(err),
        }
    }
}

impl From<SandboxError> for ToolError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::Rejected(reason) => ToolError::ValidationRejected(reason.to_string()),
            SandboxError::Timeout { seconds } => ToolError::Timeout { seconds },
            SandboxError::CommandNotFound(detail) => ToolError::CommandNotFound(detail),
            SandboxError::PermissionDenied(detail) => ToolError::PermissionDenied(detail),
            SandboxError::Io(err) => ToolError::Unexpected(err.to_string()),
            SandboxError::InvalidConfig(detail) => ToolError::Unexpected(detail),
            SandboxError::ExecutionFailed(detail) => ToolError::ExecutionFailed(detail),
        }
    }
}
