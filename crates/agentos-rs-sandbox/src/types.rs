//! Core command policy and result types.

use agentos_rs_config::{ShellConfig, ShellLimits};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::SandboxError;

/// `PATH` used when the host process has none.
pub const DEFAULT_SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";
/// Synthetic user name exported to spawned commands.
pub const SANDBOX_USER: &str = "agentos";
/// Interpreter used for every spawned command.
pub const SANDBOX_SHELL: &str = "/bin/sh";

/// A forbidden substring and the issue it indicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenyPattern {
    /// Literal substring matched against the lower-cased command.
    pub pattern: &'static str,
    /// Human readable issue reported by the safety check.
    pub description: &'static str,
}

const fn deny(pattern: &'static str, description: &'static str) -> DenyPattern {
    DenyPattern {
        pattern,
        description,
    }
}

/// Ordered denylist; the first match decides the rejection message.
pub const DENYLIST: &[DenyPattern] = &[
    deny("&&", "Command chaining detected"),
    deny("&", "Background execution detected"),
    deny("\n", "Command separator detected"),
    deny("\r", "Command separator detected"),
    deny("||", "Command chaining detected"),
    deny(";", "Command separator detected"),
    deny("|", "Pipe detected"),
    deny(">", "Output redirection detected"),
    deny(">>", "Output redirection detected"),
    deny("<", "Input redirection detected"),
    deny("`", "Command substitution detected"),
    deny("$(", "Command substitution detected"),
    deny("rm -rf", "Dangerous deletion command"),
    deny("chmod", "Permission modification command"),
    deny("chown", "Permission modification command"),
    deny("sudo", "Privilege escalation command"),
    deny("su", "Privilege escalation command"),
    deny("passwd", "Credential modification command"),
];

/// Immutable command execution policy, built once from [`ShellConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPolicy {
    /// Whitelisted base commands, kept sorted.
    pub allowed_commands: BTreeSet<String>,
    /// Denylisted substrings in match order.
    pub denylist: &'static [DenyPattern],
    /// Default timeout in seconds.
    pub timeout_seconds: u64,
    /// Per-stream output cap in characters.
    pub max_output_chars: usize,
    /// Working directory for every command.
    pub working_directory: PathBuf,
    /// `PATH` exported to commands and used to resolve base commands.
    pub path_env: String,
    /// Optional rlimits applied before exec.
    pub limits: ShellLimits,
    /// Optional cap on simultaneously running commands.
    pub max_concurrent_commands: Option<usize>,
}

impl CommandPolicy {
    /// Build a policy from config, inheriting `PATH` from the host process.
    pub fn from_config(config: &ShellConfig) -> Result<Self, SandboxError> {
        let path_env =
            std::env::var("PATH").unwrap_or_else(|_| DEFAULT_SANDBOX_PATH.to_string());
        Self::with_path_env(config, path_env)
    }

    /// Build a policy from config with an explicit `PATH`.
    pub fn with_path_env(
        config: &ShellConfig,
        path_env: impl Into<String>,
    ) -> Result<Self, SandboxError> {
        if config.timeout_seconds == 0 {
            return Err(SandboxError::InvalidConfig(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if config.max_output_chars == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_output_chars must be greater than zero".to_string(),
            ));
        }
        if let Some(limit) = config.max_concurrent_commands
            && (limit == 0 || limit > Semaphore::MAX_PERMITS)
        {
            return Err(SandboxError::InvalidConfig(format!(
                "max_concurrent_commands must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }
        let path_env = path_env.into();
        Ok(Self {
            allowed_commands: config
                .allowed_commands
                .iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
            denylist: DENYLIST,
            timeout_seconds: config.timeout_seconds,
            max_output_chars: config.max_output_chars,
            working_directory: config.working_directory.clone(),
            path_env: if path_env.is_empty() {
                DEFAULT_SANDBOX_PATH.to_string()
            } else {
                path_env
            },
            limits: config.limits.clone(),
            max_concurrent_commands: config.max_concurrent_commands,
        })
    }

    /// Sorted whitelist.
    pub fn sorted_allowed(&self) -> Vec<String> {
        self.allowed_commands.iter().cloned().collect()
    }

    /// Whether `base` is whitelisted (case-sensitive).
    pub fn is_allowed(&self, base: &str) -> bool {
        self.allowed_commands.contains(base)
    }

    /// Denylist patterns as plain strings.
    pub fn blocked_patterns(&self) -> Vec<&'static str> {
        self.denylist.iter().map(|entry| entry.pattern).collect()
    }

    /// Minimal environment exported to spawned commands.
    pub fn sandbox_env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("PATH".to_string(), self.path_env.clone()),
            (
                "HOME".to_string(),
                self.working_directory.display().to_string(),
            ),
            ("USER".to_string(), SANDBOX_USER.to_string()),
            ("SHELL".to_string(), SANDBOX_SHELL.to_string()),
        ])
    }
}

/// Command ready to be handed to a [`crate::CommandRunner`].
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Validated command line, interpreted by [`SANDBOX_SHELL`].
    pub command: String,
    /// Working directory.
    pub cwd: PathBuf,
    /// Complete environment; nothing is inherited.
    pub env: BTreeMap<String, String>,
    /// Wall clock budget.
    pub timeout: Duration,
    /// Optional rlimits.
    pub limits: ShellLimits,
}

impl CommandSpec {
    /// Build a spec for `command` under `policy` with an effective timeout.
    pub fn from_policy(policy: &CommandPolicy, command: impl Into<String>, timeout: u64) -> Self {
        Self {
            command: command.into(),
            cwd: policy.working_directory.clone(),
            env: policy.sandbox_env(),
            timeout: Duration::from_secs(timeout),
            limits: policy.limits.clone(),
        }
    }
}

/// Raw output captured from a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally.
    pub status_code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Bytes were discarded from either stream by the runner.
    pub truncated: bool,
}

/// Result of an executed command as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command: String,
    /// Exit code, `-1` when the process was terminated by a signal.
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub output_truncated: bool,
    pub execution_time_ms: u64,
    /// Effective timeout in seconds.
    pub timeout: u64,
}

impl CommandResult {
    /// Whether the process exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.return_code == 0
    }
}

/// Dry-run analysis of a command against the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub command: String,
    pub base_command: String,
    pub is_allowed: bool,
    pub is_safe: bool,
    /// Every violated rule, in denylist order after the whitelist check.
    pub safety_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{CommandPolicy, DEFAULT_SANDBOX_PATH, DENYLIST};
    use agentos_rs_config::ShellConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn policy_sorts_and_trims_whitelist() {
        let config = ShellConfig {
            allowed_commands: vec!["pwd".into(), " ls ".into(), "echo".into()],
            ..ShellConfig::default()
        };
        let policy = CommandPolicy::with_path_env(&config, "/bin").expect("policy");
        assert_eq!(policy.sorted_allowed(), vec!["echo", "ls", "pwd"]);
        assert!(policy.is_allowed("ls"));
        assert!(!policy.is_allowed("LS"));
    }

    #[test]
    fn sandbox_env_is_minimal() {
        let config = ShellConfig {
            working_directory: "/tmp/agentos-box".into(),
            ..ShellConfig::default()
        };
        let policy = CommandPolicy::with_path_env(&config, "").expect("policy");
        let env = policy.sandbox_env();
        assert_eq!(
            env.keys().cloned().collect::<Vec<_>>(),
            vec!["HOME", "PATH", "SHELL", "USER"]
        );
        assert_eq!(env["HOME"], "/tmp/agentos-box");
        assert_eq!(env["PATH"], DEFAULT_SANDBOX_PATH);
    }

    #[test]
    fn rejects_zero_limits() {
        let config = ShellConfig {
            timeout_seconds: 0,
            ..ShellConfig::default()
        };
        assert!(CommandPolicy::with_path_env(&config, "/bin").is_err());
    }

    #[test]
    fn concurrency_limit_must_fit_a_semaphore() {
        assert_eq!(
            agentos_rs_config::MAX_CONCURRENT_COMMANDS,
            tokio::sync::Semaphore::MAX_PERMITS
        );
        for limit in [0, usize::MAX, tokio::sync::Semaphore::MAX_PERMITS + 1] {
            let config = ShellConfig {
                max_concurrent_commands: Some(limit),
                ..ShellConfig::default()
            };
            assert!(
                matches!(
                    CommandPolicy::with_path_env(&config, "/bin"),
                    Err(crate::SandboxError::InvalidConfig(_))
                ),
                "{limit}"
            );
        }
        let config = ShellConfig {
            max_concurrent_commands: Some(tokio::sync::Semaphore::MAX_PERMITS),
            ..ShellConfig::default()
        };
        assert!(CommandPolicy::with_path_env(&config, "/bin").is_ok());
    }

    #[test]
    fn denylist_order_is_stable() {
        assert_eq!(DENYLIST[0].pattern, "&&");
        assert_eq!(DENYLIST.last().map(|entry| entry.pattern), Some("passwd"));
        assert_eq!(DENYLIST.len(), 18);
    }
}
