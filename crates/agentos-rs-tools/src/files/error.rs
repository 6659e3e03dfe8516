//! File gatekeeper errors.

use agentos_rs_protocol::ToolError;

/// Errors returned by [`crate::FileGatekeeper`] operations.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Extension not allowed")]
    ExtensionNotAllowed,
    /// Encoded content is over the size cap.
    #[error("Content size {size} exceeds max {limit}")]
    ContentTooLarge { size: u64, limit: u64 },
    /// File on disk is over the size cap.
    #[error("File too large: {size} bytes exceeds max {limit}")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Not found")]
    NotFound,
    #[error("Not a file: {0}")]
    NotAFile(String),
    /// Nothing usable is left after sanitising.
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("Content is not valid {encoding}: {detail}")]
    Decode {
        encoding: &'static str,
        detail: String,
    },
    #[error("Content cannot be encoded as {encoding}: {detail}")]
    Encode {
        encoding: &'static str,
        detail: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] agentos_rs_config::ConfigError),
}

impl From<FileError> for ToolError {
    fn from(err: FileError) -> Self {
        let message = err.to_string();
        match err {
            FileError::ExtensionNotAllowed | FileError::NotAFile(_) => {
                ToolError::ValidationRejected(message)
            }
            FileError::ContentTooLarge { .. } | FileError::FileTooLarge { .. } => {
                ToolError::ResourceLimitExceeded(message)
            }
            FileError::NotFound => ToolError::NotFound(message),
            FileError::InvalidFilename(_)
            | FileError::InvalidPattern(_)
            | FileError::UnsupportedEncoding(_)
            | FileError::Encode { .. } => ToolError::InvalidArguments(message),
            FileError::Decode { .. } => ToolError::ExecutionFailed(message),
            FileError::Config(_) => ToolError::Unexpected(message),
            FileError::Io(io) => match io.kind() {
                std::io::ErrorKind::NotFound => ToolError::NotFound("Not found".to_string()),
                std::io::ErrorKind::PermissionDenied => ToolError::PermissionDenied(io.to_string()),
                _ => ToolError::Unexpected(io.to_string()),
            },
        }
    }
}
