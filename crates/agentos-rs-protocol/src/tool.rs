/// Errors returned by tools and gatekeeper operations.
///
/// The display text of every variant is the human readable message handed to
/// the caller verbatim, so it carries no prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Tool name was not found in registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
    /// Tool received invalid arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// Request was rejected by a whitelist, denylist or input check.
    #[error("{0}")]
    ValidationRejected(String),
    /// A size or output bound was exceeded.
    #[error("{0}")]
    ResourceLimitExceeded(String),
    /// Target file does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Process exceeded its time bound and was killed.
    #[error("Command timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    /// The operating system could not find the command.
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    /// The operating system denied the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Operation failed for a reason reported by the operating system.
    #[error("{0}")]
    ExecutionFailed(String),
    /// Any other fault.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ToolError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound(_) => "tool_not_found",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::ValidationRejected(_) => "validation_rejected",
            ToolError::ResourceLimitExceeded(_) => "resource_limit_exceeded",
            ToolError::NotFound(_) => "not_found",
            ToolError::Timeout { .. } => "timeout",
            ToolError::CommandNotFound(_) => "command_not_found",
            ToolError::PermissionDenied(_) => "permission_denied",
            ToolError::ExecutionFailed(_) => "execution_failed",
            ToolError::Unexpected(_) => "unexpected",
        }
    }
}
