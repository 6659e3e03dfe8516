//! Command gatekeeping: whitelist/denylist validation and bounded process execution.

pub mod error;
pub mod gatekeeper;
pub mod runner;
pub mod system_info;
pub mod types;
pub mod validator;

/// Sandbox error types.
pub use error::{RejectionReason, SandboxError};
/// Gatekeeper and its listing payload.
pub use gatekeeper::{AllowedCommands, CommandGatekeeper};
/// Runner trait and the local process runner.
pub use runner::{CommandRunner, LocalProcessRunner};
/// System information payload.
pub use system_info::SystemInfo;
/// Core policy and result types.
pub use types::{
    CommandOutput, CommandPolicy, CommandResult, CommandSpec, DENYLIST, DenyPattern, SafetyReport,
};
/// Command validator.
pub use validator::CommandValidator;
